//! Text rendering shared by the handlers.

use crate::protocol::CallToolResult;
use std::fmt::{Display, Write};

/// Builder for `Key: value` blocks.
pub(crate) struct Details {
    out: String,
    indent: &'static str,
}

impl Details {
    /// Start a block with a `<title>:` header line.
    pub(crate) fn new(title: &str) -> Self {
        Self {
            out: format!("{title}:\n"),
            indent: "",
        }
    }

    pub(crate) fn field(mut self, key: &str, value: impl Display) -> Self {
        let _ = writeln!(self.out, "{}{key}: {value}", self.indent);
        self
    }

    /// Skip the line when `value` is `None`.
    pub(crate) fn field_opt(self, key: &str, value: Option<impl Display>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Comma-separated values; skipped when empty.
    pub(crate) fn list(self, key: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values.join(", ");
        self.field(key, joined)
    }

    /// Start an indented sub-section.
    pub(crate) fn section(mut self, title: &str) -> Self {
        let _ = writeln!(self.out, "\n{title}:");
        self.indent = "  ";
        self
    }

    /// Add a free-form line at the current indentation.
    pub(crate) fn line(mut self, text: impl Display) -> Self {
        let _ = writeln!(self.out, "{}{text}", self.indent);
        self
    }

    pub(crate) fn finish(self) -> String {
        self.out.trim_end().to_string()
    }

    pub(crate) fn into_result(self) -> CallToolResult {
        CallToolResult::text(self.finish())
    }
}

/// `Found N <resource>:` followed by one block per item.
pub(crate) fn list_result<T>(
    resource: &str,
    items: &[T],
    render: impl Fn(&T) -> String,
) -> CallToolResult {
    let mut out = format!("Found {} {resource}:", items.len());
    for item in items {
        out.push_str("\n\n");
        out.push_str(&render(item));
    }
    CallToolResult::text(out)
}

/// `value` or `"none"`.
pub(crate) fn or_none(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "none",
    }
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
