//! Ways of showing the control: a full-screen table or plain text

mod plain;
mod table;

pub use plain::PlainView;
pub use table::{TesterView, TesterViewProps, UiMsg, FIXED_TABLE_ROWS};

use pcf_tester::HostContext;

/// Parameter that decides the log table's height mode.
pub const FORM_HEIGHT_PARAMETER: &str = "formHeight";

/// How tall the log table is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightMode {
    /// Fixed number of rows
    Fixed,
    /// Whatever the container leaves over
    #[default]
    Auto,
}

impl HeightMode {
    /// `Fixed` when `formHeight` holds a number above 50.
    pub fn from_host(ctx: &HostContext) -> Self {
        match ctx
            .raw(FORM_HEIGHT_PARAMETER)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
        {
            Some(height) if height > 50 => HeightMode::Fixed,
            _ => HeightMode::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(form_height: Option<&str>) -> HostContext {
        let mut ctx = HostContext::default();
        ctx.parameters.insert(
            FORM_HEIGHT_PARAMETER.to_string(),
            form_height.map(str::to_string),
        );
        ctx
    }

    #[test]
    fn test_height_mode() {
        assert_eq!(HeightMode::from_host(&ctx(Some("80"))), HeightMode::Fixed);
        assert_eq!(HeightMode::from_host(&ctx(Some("50"))), HeightMode::Auto);
        assert_eq!(HeightMode::from_host(&ctx(Some("tall"))), HeightMode::Auto);
        assert_eq!(HeightMode::from_host(&ctx(None)), HeightMode::Auto);
        assert_eq!(HeightMode::from_host(&HostContext::default()), HeightMode::Auto);
    }
}
