use ammonia;

/// Clean user-supplied text using the ammonia library.
///
/// Profile fields end up in HTML pages rendered by clients, so markup such as
/// `<script>` (with its content) and event-handler attributes is stripped
/// before the value is stored. Plain text passes through unchanged apart from
/// entity escaping of `<`, `>` and `&`.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_kept() {
        assert_eq!(clean_html("  Ann "), "Ann");
        assert_eq!(clean_html("hiking, chess"), "hiking, chess");
    }

    #[test]
    fn scripts_are_removed() {
        assert_eq!(clean_html("<script>alert(1)</script>Bob"), "Bob");
        assert_eq!(
            clean_html("<b onclick=\"x()\">bold</b>"),
            "<b>bold</b>"
        );
    }
}
