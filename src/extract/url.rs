//! Image URL normalization.

/// Protocol-relative URLs get `https:`; anything else is returned as is.
pub fn normalize_image_url(src: &str) -> String {
    let src = src.trim();
    if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    }
}

/// Value of a query parameter in an absolute URL.
pub fn query_param(page_url: &str, name: &str) -> Option<String> {
    let parsed = url::Url::parse(page_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_relative_gets_https() {
        assert_eq!(
            normalize_image_url("//cdn.domeggook.com/upload/item/1.jpg"),
            "https://cdn.domeggook.com/upload/item/1.jpg"
        );
    }

    #[test]
    fn other_forms_unchanged() {
        assert_eq!(normalize_image_url("https://a/b.jpg"), "https://a/b.jpg");
        assert_eq!(normalize_image_url("/img/b.jpg"), "/img/b.jpg");
        assert_eq!(normalize_image_url("b.jpg"), "b.jpg");
    }

    #[test]
    fn reads_query_param() {
        assert_eq!(
            query_param("https://item.gmarket.co.kr/Item?goodscode=2345&ver=1", "goodscode"),
            Some("2345".to_string())
        );
        assert_eq!(query_param("https://item.gmarket.co.kr/Item", "goodscode"), None);
        assert_eq!(query_param("not a url", "goodscode"), None);
    }
}
