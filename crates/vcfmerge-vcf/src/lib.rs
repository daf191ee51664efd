pub mod error;
pub mod source;
pub mod vcf;

pub use error::{Result, VcfError};
pub use source::{FileSource, VcfSource};
pub use vcf::{parse_vcf, write_vcf, ParsedVcf};
