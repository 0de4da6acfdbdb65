/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// `[!]text [| primary [| secondary]]`. A leading `!` promotes the message.
	Message {
		text: String,
		primary: Option<String>,
		secondary: Option<String>,
		promote: bool,
	},
	Pause,
	Resume,
	Hover,
	Leave,
	Click,
	ClickSecondary,
	Hide,
	Show,
	Clear,
	Status,
	Help,
	Quit,
}

impl Command {
	/// Parses one input line. Blank lines yield `None`.
	pub fn parse(line: &str) -> Result<Option<Self>, String> {
		let line = line.trim();
		if line.is_empty() {
			return Ok(None);
		}
		if let Some(name) = line.strip_prefix(':') {
			let command = match name.trim() {
				"pause" => Self::Pause,
				"resume" => Self::Resume,
				"hover" => Self::Hover,
				"leave" => Self::Leave,
				"click" | "click1" => Self::Click,
				"click2" => Self::ClickSecondary,
				"hide" => Self::Hide,
				"show" => Self::Show,
				"clear" => Self::Clear,
				"status" => Self::Status,
				"help" | "h" => Self::Help,
				"quit" | "q" => Self::Quit,
				other => return Err(format!("unknown command `:{other}`, try `:help`")),
			};
			return Ok(Some(command));
		}

		let (promote, line) = match line.strip_prefix('!') {
			Some(rest) => (true, rest),
			None => (false, line),
		};
		let mut parts = line.split('|').map(str::trim);
		let text = parts.next().unwrap_or_default().to_string();
		let mut label = || parts.next().filter(|l| !l.is_empty()).map(str::to_string);
		let primary = label();
		let secondary = label();
		Ok(Some(Self::Message {
			text,
			primary,
			secondary,
			promote,
		}))
	}
}

pub const HELP: &str = "\
type a line to enqueue it; `!text` promotes, `text | undo | details` adds actions
:pause :resume   hold or release the countdown
:hover :leave    pointer over or off the surface
:click :click2   invoke the primary or secondary action
:hide :show      make the surface unavailable or available
:clear :status :quit";
