//! Docstring → block doc-comment conversion.
//!
//! The sole first string-literal statement of a function/class/module body
//! is extracted here and never re-emitted as a runtime statement. The text
//! splits into a free-form summary plus the recognized Google-style
//! sections `Args:`, `Returns:` and `Raises:`; everything unparsed appends
//! as extra summary lines.

/// Render a docstring as a `/** ... */` comment, each line prefixed with
/// `pad`. The result ends with a newline.
pub fn doc_comment(text: &str, pad: &str) -> String {
    let doc = parse(text);
    let mut lines: Vec<String> = Vec::new();

    lines.extend(doc.summary);

    if !doc.params.is_empty() || doc.returns.is_some() || !doc.raises.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        for (name, desc) in &doc.params {
            if desc.is_empty() {
                lines.push(format!("@param {name}"));
            } else {
                lines.push(format!("@param {name} - {desc}"));
            }
        }
        if let Some(desc) = &doc.returns {
            lines.push(format!("@returns {desc}"));
        }
        for (name, desc) in &doc.raises {
            lines.push(format!("@throws {{{name}}} {desc}"));
        }
    }

    let mut out = format!("{pad}/**\n");
    for line in &lines {
        if line.is_empty() {
            out.push_str(&format!("{pad} *\n"));
        } else {
            out.push_str(&format!("{pad} * {line}\n"));
        }
    }
    out.push_str(&format!("{pad} */\n"));
    out
}

struct ParsedDoc {
    summary: Vec<String>,
    params: Vec<(String, String)>,
    returns: Option<String>,
    raises: Vec<(String, String)>,
}

#[derive(PartialEq)]
enum Section {
    Summary,
    Args,
    Returns,
    Raises,
}

fn parse(text: &str) -> ParsedDoc {
    let mut doc = ParsedDoc {
        summary: Vec::new(),
        params: Vec::new(),
        returns: None,
        raises: Vec::new(),
    };
    let mut section = Section::Summary;

    for raw in text.lines() {
        let line = raw.trim();
        match line {
            "Args:" | "Arguments:" => {
                section = Section::Args;
                continue;
            }
            "Returns:" => {
                section = Section::Returns;
                continue;
            }
            "Raises:" => {
                section = Section::Raises;
                continue;
            }
            _ => {}
        }

        match section {
            Section::Summary => {
                if !(line.is_empty() && doc.summary.is_empty()) {
                    doc.summary.push(line.to_string());
                }
            }
            Section::Args => match split_entry(line) {
                Some((name, desc)) => doc.params.push((strip_type(&name), desc)),
                None if line.is_empty() => {}
                None => append_continuation(&mut doc.params, line, &mut doc.summary),
            },
            Section::Returns => {
                if line.is_empty() {
                    continue;
                }
                match &mut doc.returns {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(line);
                    }
                    None => doc.returns = Some(line.to_string()),
                }
            }
            Section::Raises => match split_entry(line) {
                Some((name, desc)) => doc.raises.push((name, desc)),
                None if line.is_empty() => {}
                None => append_continuation(&mut doc.raises, line, &mut doc.summary),
            },
        }
    }

    while doc.summary.last().is_some_and(|l| l.is_empty()) {
        doc.summary.pop();
    }
    doc
}

/// Split `name: description` into its halves.
fn split_entry(line: &str) -> Option<(String, String)> {
    let (name, desc) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || name.contains(' ') && !name.contains('(') {
        return None;
    }
    Some((name.to_string(), desc.trim().to_string()))
}

/// A wrapped line continues the previous entry; with no entry open it is
/// unparsed trailing content and joins the summary.
fn append_continuation(
    entries: &mut Vec<(String, String)>,
    line: &str,
    summary: &mut Vec<String>,
) {
    match entries.last_mut() {
        Some((_, desc)) => {
            if !desc.is_empty() {
                desc.push(' ');
            }
            desc.push_str(line);
        }
        None => summary.push(line.to_string()),
    }
}

/// Drop an inline parenthesized type annotation: `count (int)` → `count`.
fn strip_type(name: &str) -> String {
    match name.split_once('(') {
        Some((bare, _)) => bare.trim().to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_only() {
        let out = doc_comment("Add two numbers.", "");
        assert_eq!(out, "/**\n * Add two numbers.\n */\n");
    }

    #[test]
    fn args_section_becomes_params() {
        let text = "Greet someone.\n\nArgs:\n    name: Who to greet.\n    times (int): Repeat count.\n";
        let out = doc_comment(text, "");
        assert_eq!(
            out,
            "/**\n * Greet someone.\n *\n * @param name - Who to greet.\n * @param times - Repeat count.\n */\n"
        );
    }

    #[test]
    fn returns_and_raises() {
        let text = "Do a thing.\n\nReturns:\n    The result.\n\nRaises:\n    ValueError: When the input is bad.\n";
        let out = doc_comment(text, "");
        assert!(out.contains(" * @returns The result.\n"));
        assert!(out.contains(" * @throws {ValueError} When the input is bad.\n"));
    }

    #[test]
    fn wrapped_entry_lines_join() {
        let text = "Args:\n    path: The file\n        to read.\n";
        let out = doc_comment(text, "");
        assert!(out.contains("@param path - The file to read."));
    }

    #[test]
    fn indented_output_uses_pad() {
        let out = doc_comment("Inner.", "  ");
        assert_eq!(out, "  /**\n   * Inner.\n   */\n");
    }
}
