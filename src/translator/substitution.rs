//! Positional substitution into translation templates.

use std::fmt::Display;

/// Where a placeholder takes its argument from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Next argument in order
    Implicit,
    /// Explicit 1-based index (`%2$s`)
    Explicit(usize),
}

/// Substitutes `args` into `template`.
///
/// Supported placeholders: `%s`, `%S` (upper-cased), `%d`, explicit indices
/// such as `%2$s`, plus `%%` and `%n`. Every argument is rendered with
/// [`Display`]. A placeholder without a matching argument, or one this
/// formatter does not understand, is left in the output verbatim, so
/// formatting never fails.
///
/// # Examples
/// ```
/// use translation_hub::translator::format_template;
///
/// assert_eq!(format_template("Hello %s!", &[&"World"]), "Hello World!");
/// assert_eq!(format_template("%2$s, %1$s", &[&"a", &"b"]), "b, a");
/// assert_eq!(format_template("%d%%", &[&50]), "50%");
/// ```
#[must_use]
pub fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_implicit = 0;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut token = String::from('%');
        let mut digits = String::new();
        while let Some(digit) = chars.next_if(char::is_ascii_digit) {
            digits.push(digit);
        }
        token.push_str(&digits);

        let position = if digits.is_empty() {
            Position::Implicit
        } else if chars.next_if_eq(&'$').is_some() {
            token.push('$');
            match digits.parse::<usize>() {
                Ok(index) if index > 0 => Position::Explicit(index),
                _ => {
                    out.push_str(&token);
                    continue;
                }
            }
        } else {
            // width and precision are not supported
            out.push_str(&token);
            continue;
        };

        let Some(conversion) = chars.next() else {
            out.push_str(&token);
            break;
        };
        token.push(conversion);

        match (conversion, position) {
            ('%', Position::Implicit) => out.push('%'),
            ('n', Position::Implicit) => out.push('\n'),
            ('s' | 'S' | 'd', _) => {
                let index = match position {
                    Position::Implicit => {
                        next_implicit += 1;
                        next_implicit - 1
                    }
                    Position::Explicit(index) => index - 1,
                };
                match args.get(index) {
                    Some(arg) if conversion == 'S' => out.push_str(&arg.to_string().to_uppercase()),
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => out.push_str(&token),
                }
            }
            _ => out.push_str(&token),
        }
    }

    out
}
