//! ANSI color helpers for batch status output.

fn paint(code: &str, s: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", code, s)
}

pub fn green(s: &str) -> String {
    paint("32", s)
}

pub fn red(s: &str) -> String {
    paint("31", s)
}

pub fn yellow(s: &str) -> String {
    paint("33", s)
}

pub fn bold(s: &str) -> String {
    paint("1", s)
}

/// Right-aligned, bold green label for a finished step.
pub fn status_label(label: &str) -> String {
    paint("1;32", &format!("{:>12}", label))
}

/// Right-aligned, bold red label for a failed step.
pub fn failure_label(label: &str) -> String {
    paint("1;31", &format!("{:>12}", label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_padded_inside_the_escape() {
        assert_eq!(status_label("Sorted"), "\x1b[1;32m      Sorted\x1b[0m");
        assert_eq!(red("x"), "\x1b[31mx\x1b[0m");
    }
}
