use clap::Arg;
use clap::builder::StyledStr;
use clap::builder::styling::{AnsiColor, Color, Style};

const DEFAULT_MARKER: &str = "(default: ";

/// Move clap's trailing `[default: ..]`, `[possible values: ..]` and
/// `[env: ..]` annotations into the help text, dimmed.
pub(crate) fn dim_cli_annotations(mut arg: Arg) -> Arg {
	let help_text = arg
		.get_help()
		.map(ToString::to_string)
		.unwrap_or_default();
	let mut annotations = Vec::new();

	if let Some(annotation) = possible_values_annotation(&arg) {
		arg = arg.hide_possible_values(true);
		annotations.push(annotation);
	}
	if !help_text.contains(DEFAULT_MARKER)
		&& let Some(annotation) = default_value_annotation(&arg)
	{
		arg = arg.hide_default_value(true);
		annotations.push(annotation);
	}
	if let Some(annotation) = env_annotation(&arg) {
		arg = arg.hide_env(true);
		annotations.push(annotation);
	}

	if help_text.is_empty() && annotations.is_empty() {
		return arg;
	}
	arg.help(styled_help(&help_text, &annotations))
}

fn muted() -> Style {
	Style::new()
		.fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)))
		.dimmed()
}

fn push_muted(target: &mut StyledStr, text: &str) {
	let style = muted();
	let _ = std::fmt::write(target, format_args!("{style}{text}{style:#}"));
}

/// Help text with an inline `(default: ..)` and the extra annotations dimmed.
fn styled_help(help: &str, annotations: &[String]) -> StyledStr {
	let mut styled = StyledStr::new();
	let mut has_text = !help.is_empty();
	match help.find(DEFAULT_MARKER) {
		Some(start) => {
			let end = help[start..]
				.find(')')
				.map_or(help.len(), |offset| start + offset + 1);
			styled.push_str(&help[..start]);
			push_muted(&mut styled, &help[start..end]);
			styled.push_str(&help[end..]);
		}
		None => styled.push_str(help),
	}
	for annotation in annotations {
		if has_text {
			styled.push_str(" ");
		}
		push_muted(&mut styled, annotation);
		has_text = true;
	}
	styled
}

fn quote_if_spaced(value: &str) -> String {
	if value.chars().any(char::is_whitespace) {
		format!("{value:?}")
	} else {
		value.to_string()
	}
}

fn possible_values_annotation(arg: &Arg) -> Option<String> {
	if !arg.get_action().takes_values() {
		return None;
	}
	let visible: Vec<_> = arg
		.get_possible_values()
		.iter()
		.filter(|value| !value.is_hide_set())
		.map(|value| quote_if_spaced(value.get_name()))
		.collect();
	(!visible.is_empty()).then(|| format!("[possible values: {}]", visible.join(", ")))
}

fn default_value_annotation(arg: &Arg) -> Option<String> {
	let rendered: Vec<_> = arg
		.get_default_values()
		.iter()
		.map(|value| value.to_string_lossy())
		.filter(|text| !text.trim().is_empty())
		.map(|text| quote_if_spaced(&text))
		.collect();
	(!rendered.is_empty()).then(|| format!("(default: {})", rendered.join(", ")))
}

fn env_annotation(arg: &Arg) -> Option<String> {
	let name = arg.get_env()?.to_string_lossy();
	(!name.trim().is_empty()).then(|| format!("[env: {name}=]"))
}
