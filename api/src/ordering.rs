/// Parsed `ordering` query parameter. A leading `-` means descending,
/// matching the convention the frontend already speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering<'a> {
    pub field: &'a str,
    pub descending: bool,
}

pub fn parse<'a>(param: Option<&'a str>, default: &'a str) -> Ordering<'a> {
    let raw = param.filter(|s| !s.is_empty()).unwrap_or(default);
    match raw.strip_prefix('-') {
        Some(field) => Ordering {
            field,
            descending: true,
        },
        None => Ordering {
            field: raw,
            descending: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direction() {
        assert_eq!(
            parse(Some("name"), "-created"),
            Ordering {
                field: "name",
                descending: false
            }
        );
        assert_eq!(
            parse(Some("-start_date"), "-created"),
            Ordering {
                field: "start_date",
                descending: true
            }
        );
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(
            parse(None, "-created"),
            Ordering {
                field: "created",
                descending: true
            }
        );
        assert_eq!(
            parse(Some(""), "title"),
            Ordering {
                field: "title",
                descending: false
            }
        );
    }
}
