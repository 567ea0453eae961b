/// Text commands understood by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    History,
    Help,
    /// Any other text
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let normalized = text.trim().trim_start_matches('/').to_lowercase();
        match normalized.as_str() {
            "ประวัติ" | "ประวัติการวิเคราะห์" | "history" => Command::History,
            "help" | "วิธีใช้" | "ช่วยเหลือ" => Command::Help,
            _ => Command::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("ประวัติ"), Command::History);
        assert_eq!(Command::parse("  History \n"), Command::History);
        assert_eq!(Command::parse("/history"), Command::History);
        assert_eq!(Command::parse("วิธีใช้"), Command::Help);
        assert_eq!(Command::parse("สวัสดี"), Command::Unknown);
        assert_eq!(Command::parse("ประวัติของฉัน"), Command::Unknown);
        assert_eq!(Command::parse(""), Command::Unknown);
    }
}
