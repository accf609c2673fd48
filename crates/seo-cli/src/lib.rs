//! Library side of the `seo-audit` binary: logging setup and the audit
//! pipeline that ties the stages together.

pub mod logging;
pub mod pipeline;
