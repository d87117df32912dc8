// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use super::diagnostic::Diagnostic;
use crate::fragment::Fragment;

pub struct DefaultRenderer;

impl DefaultRenderer {
	pub fn render_string(diagnostic: &Diagnostic) -> String {
		let mut output = String::new();
		Self::render(&mut output, diagnostic, 0);
		output
	}

	fn render(output: &mut String, diagnostic: &Diagnostic, depth: usize) {
		let indent = "  ".repeat(depth);
		let _ = writeln!(output, "{indent}Error {}: {}", diagnostic.code, diagnostic.message);

		if let Fragment::Statement {
			text,
			line,
			column,
		} = &diagnostic.fragment
		{
			let _ = writeln!(output, "{indent}  --> line {}, column {}", line.0, column.0);
			if let Some(statement) = &diagnostic.statement {
				if let Some(source_line) = statement.lines().nth(line.0.saturating_sub(1) as usize) {
					let _ = writeln!(output, "{indent}   | {source_line}");
					let pad = " ".repeat(column.0 as usize);
					let marks = "^".repeat(text.chars().count().max(1));
					match &diagnostic.label {
						Some(label) => {
							let _ = writeln!(output, "{indent}   | {pad}{marks} {label}");
						}
						None => {
							let _ = writeln!(output, "{indent}   | {pad}{marks}");
						}
					}
				}
			} else if let Some(label) = &diagnostic.label {
				let _ = writeln!(output, "{indent}  near `{text}`: {label}");
			}
		}

		if let Some(help) = &diagnostic.help {
			let _ = writeln!(output, "{indent}help: {help}");
		}
		for note in &diagnostic.notes {
			let _ = writeln!(output, "{indent}note: {note}");
		}
		if let Some(cause) = &diagnostic.cause {
			let _ = writeln!(output, "{indent}caused by:");
			Self::render(output, cause, depth + 1);
		}
	}
}
