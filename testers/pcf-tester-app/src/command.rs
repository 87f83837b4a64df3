//! Typed commands parsed from the command line
//!
//! A line is `<verb> <arg0> <arg1> ...` split on whitespace. Verbs are
//! matched exactly (lowercase); anything else becomes [`Command::Unknown`].
//! Arguments are never validated beyond the numeric defaults below.

use std::time::Duration;

/// One command entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `event`: new `output_2` value, signal a host action
    Event,
    /// `eventnotify`: as `event`, then notify outputs changed
    EventNotify,
    /// `eventschedule`: new `output_2`, host action deferred to the next view update
    EventSchedule,
    /// `setselection`: select the first sorted record
    SetSelection,
    ClearProperty { key: Option<String> },
    Set { key: Option<String>, value: String },
    SetState { key: Option<String>, value: String },
    ClearState,
    PageSize(u32),
    /// `report`: replay every mode probe now
    Report,
    Mode(String),
    /// `notify [N] [D]`: N output changes, `i * D` apart
    Notify { count: u32, interval: Duration },
    /// `clear` / `cls`
    Clear,
    /// `add [N]`: N test rows
    Add(u32),
    Refresh,
    LoadNextPage,
    LoadPreviousPage,
    LoadExactPage(u32),
    Unknown(String),
}

/// Count-like argument: missing, unparsable or zero falls back to 1.
fn count_arg(arg: Option<&str>) -> u32 {
    arg.and_then(|a| a.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Duration in milliseconds: missing or unparsable falls back to 0.
fn millis_arg(arg: Option<&str>) -> Duration {
    Duration::from_millis(arg.and_then(|a| a.parse::<u64>().ok()).unwrap_or(0))
}

impl Command {
    /// Parse a full command line. `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?;
        let args: Vec<&str> = parts.collect();
        Some(Self::from_parts(verb, &args))
    }

    /// Build a command from an already split verb and arguments.
    pub fn from_parts(verb: &str, args: &[&str]) -> Self {
        let arg = |i: usize| args.get(i).copied();
        let owned = |i: usize| arg(i).map(str::to_string);

        match verb {
            "event" => Command::Event,
            "eventnotify" => Command::EventNotify,
            "eventschedule" => Command::EventSchedule,
            "setselection" => Command::SetSelection,
            "clearproperty" => Command::ClearProperty { key: owned(0) },
            "set" => Command::Set {
                key: owned(0),
                value: owned(1).unwrap_or_default(),
            },
            "setstate" => Command::SetState {
                key: owned(0),
                value: owned(1).unwrap_or_default(),
            },
            "clearstate" => Command::ClearState,
            "pagesize" => Command::PageSize(count_arg(arg(0))),
            "report" => Command::Report,
            "mode" => Command::Mode(owned(0).unwrap_or_else(|| pcf_tester::DEFAULT_MODE.into())),
            "notify" | "notify_n" => Command::Notify {
                count: count_arg(arg(0)),
                interval: millis_arg(arg(1)),
            },
            "clear" | "cls" => Command::Clear,
            "add" => Command::Add(count_arg(arg(0))),
            "refresh" => Command::Refresh,
            "loadnextpage" => Command::LoadNextPage,
            "loadpreviouspage" => Command::LoadPreviousPage,
            "loadexactpage" => Command::LoadExactPage(count_arg(arg(0))),
            other => Command::Unknown(other.to_string()),
        }
    }

    /// The verb this command is entered with.
    pub fn verb(&self) -> &str {
        match self {
            Command::Event => "event",
            Command::EventNotify => "eventnotify",
            Command::EventSchedule => "eventschedule",
            Command::SetSelection => "setselection",
            Command::ClearProperty { .. } => "clearproperty",
            Command::Set { .. } => "set",
            Command::SetState { .. } => "setstate",
            Command::ClearState => "clearstate",
            Command::PageSize(_) => "pagesize",
            Command::Report => "report",
            Command::Mode(_) => "mode",
            Command::Notify { .. } => "notify",
            Command::Clear => "clear",
            Command::Add(_) => "add",
            Command::Refresh => "refresh",
            Command::LoadNextPage => "loadnextpage",
            Command::LoadPreviousPage => "loadpreviouspage",
            Command::LoadExactPage(_) => "loadexactpage",
            Command::Unknown(verb) => verb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_verbs_without_args() {
        assert_eq!(Command::parse("event"), Some(Command::Event));
        assert_eq!(Command::parse("cls"), Some(Command::Clear));
        assert_eq!(Command::parse("clear"), Some(Command::Clear));
        assert_eq!(Command::parse("report"), Some(Command::Report));
        assert_eq!(Command::parse("loadnextpage"), Some(Command::LoadNextPage));
    }

    #[test]
    fn test_set_and_clearproperty() {
        assert_eq!(
            Command::parse("set output_1 hello"),
            Some(Command::Set {
                key: Some("output_1".into()),
                value: "hello".into()
            })
        );
        assert_eq!(
            Command::parse("set output_1"),
            Some(Command::Set {
                key: Some("output_1".into()),
                value: String::new()
            })
        );
        assert_eq!(
            Command::parse("clearproperty output_1"),
            Some(Command::ClearProperty {
                key: Some("output_1".into())
            })
        );
    }

    #[test]
    fn test_numeric_defaults() {
        assert_eq!(Command::parse("add"), Some(Command::Add(1)));
        assert_eq!(Command::parse("add 0"), Some(Command::Add(1)));
        assert_eq!(Command::parse("add x"), Some(Command::Add(1)));
        assert_eq!(Command::parse("add 7"), Some(Command::Add(7)));
        assert_eq!(Command::parse("pagesize"), Some(Command::PageSize(1)));
        assert_eq!(Command::parse("loadexactpage 3"), Some(Command::LoadExactPage(3)));
    }

    #[test]
    fn test_notify_and_alias() {
        let expected = Command::Notify {
            count: 3,
            interval: Duration::from_millis(100),
        };
        assert_eq!(Command::parse("notify 3 100"), Some(expected.clone()));
        assert_eq!(Command::parse("notify_n 3 100"), Some(expected));
        assert_eq!(
            Command::parse("notify"),
            Some(Command::Notify {
                count: 1,
                interval: Duration::ZERO
            })
        );
    }

    #[test]
    fn test_mode_defaults() {
        assert_eq!(
            Command::parse("mode error,size"),
            Some(Command::Mode("error,size".into()))
        );
        assert_eq!(Command::parse("mode"), Some(Command::Mode("default".into())));
    }

    #[test]
    fn test_extra_whitespace_is_ignored() {
        assert_eq!(
            Command::parse("  setstate   k   v  "),
            Some(Command::SetState {
                key: Some("k".into()),
                value: "v".into()
            })
        );
    }

    #[test]
    fn test_unknown_verb() {
        let cmd = Command::parse("Event").unwrap();
        assert_eq!(cmd, Command::Unknown("Event".into()));
        assert_eq!(cmd.verb(), "Event");
    }

    #[test]
    fn test_verb_round_trip() {
        for line in ["event", "set", "notify", "add", "mode", "loadexactpage"] {
            assert_eq!(Command::parse(line).unwrap().verb(), line);
        }
    }
}
