//! Console output helpers.

/// Render `body` inside a titled box.
pub fn panel(title: &str, body: &str) -> String {
    let width = body
        .lines()
        .map(|l| l.chars().count())
        .chain(std::iter::once(title.chars().count() + 2))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let header = format!(" {title} ");
    let fill = width + 2 - header.chars().count();
    out.push_str(&format!(
        "╭{}{}{}╮\n",
        "─".repeat(fill / 2),
        header,
        "─".repeat(fill - fill / 2)
    ));
    for line in body.lines() {
        let pad = width - line.chars().count();
        out.push_str(&format!("│ {}{} │\n", line, " ".repeat(pad)));
    }
    out.push_str(&format!("╰{}╯\n", "─".repeat(width + 2)));
    out
}

pub fn print_panel(title: &str, body: &str) {
    print!("{}", panel(title, body));
}
