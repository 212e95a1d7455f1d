#![deny(warnings)]
pub mod distribute;
pub mod error;
pub mod owner;
pub mod plan;
pub mod weighted;

pub use error::EngineError;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "orgseed"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "orgseed");
        assert!(!AppInfo::version().is_empty());
    }
}
