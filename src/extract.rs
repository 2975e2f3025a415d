//! HTML to visible text: drop script/style blocks, strip tags, decode
//! entities, collapse whitespace. Heuristic by design; the downstream
//! matchers only need the words a visitor would see.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static RE_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub fn visible_text(html: &str) -> String {
    let out = RE_SCRIPT.replace_all(html, " ");
    let out = RE_STYLE.replace_all(&out, " ");
    let out = RE_TAGS.replace_all(&out, " ");
    let out = html_escape::decode_html_entities(&out).to_string();
    RE_WS.replace_all(&out, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<html><body><h1>Race</h1>\n<p>Registration   opens on <b>January 10, 2026</b></p></body></html>";
        assert_eq!(
            visible_text(html),
            "Race Registration opens on January 10, 2026"
        );
    }

    #[test]
    fn drops_script_and_style_blocks() {
        let html = "<style>p { color: red }</style><script>var opens = 'never';</script><p>closed</p>";
        assert_eq!(visible_text(html), "closed");
    }

    #[test]
    fn decodes_entities() {
        let html = "<p>Inscri&ccedil;&otilde;es &mdash; abertas</p>";
        assert_eq!(visible_text(html), "Inscrições — abertas");
    }
}
