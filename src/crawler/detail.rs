//! Detail page extraction
//!
//! Each field is looked up independently. A missing element or a missing match
//! leaves that one field empty and never affects the others.

use crate::crawler::parser::{normalize_whitespace, Document, Node};
use crate::crawler::selectors::Selectors;
use crate::url::extract_card_id;
use serde::{Deserialize, Serialize};

/// Separator used for list-valued fields
pub const LIST_SEPARATOR: &str = "; ";

/// Column names of the metadata table, in record field order
pub const METADATA_HEADER: [&str; 9] = [
    "card_id",
    "veteran_name",
    "birth_date",
    "birth_place",
    "death_date",
    "death_place",
    "operations",
    "biography",
    "rewards",
];

/// Everything extracted for one card
///
/// Field order is the metadata column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VeteranRecord {
    #[serde(rename = "card_id")]
    pub id: String,
    #[serde(rename = "veteran_name")]
    pub name: String,
    pub birth_date: String,
    pub birth_place: String,
    pub death_date: String,
    pub death_place: String,
    /// Operations joined with `"; "`
    pub operations: String,
    pub biography: String,
    /// Decorations joined with `"; "`
    #[serde(rename = "rewards")]
    pub decorations: String,
}

impl VeteranRecord {
    /// A record carrying only the id, used when the detail page is unavailable
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Labelled fields on the detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfoField {
    BirthDate,
    BirthPlace,
    DeathDate,
    DeathPlace,
}

/// Lowercase label fragments and the field each one fills
const LABELS: [(&str, InfoField); 5] = [
    ("дата рождения", InfoField::BirthDate),
    ("место рождения", InfoField::BirthPlace),
    ("дата смерти", InfoField::DeathDate),
    ("место смерти", InfoField::DeathPlace),
    ("место гибели", InfoField::DeathPlace),
];

fn classify_label(label: &str) -> Option<InfoField> {
    let label = label.to_lowercase();
    LABELS
        .iter()
        .find(|(fragment, _)| label.contains(fragment))
        .map(|(_, field)| *field)
}

/// Builds the record for one detail page
///
/// Extraction never fails; the id always comes from `detail_url`.
pub fn extract_detail(document: &Document, detail_url: &str, selectors: &Selectors) -> VeteranRecord {
    let id = extract_card_id(detail_url);
    if id.is_empty() {
        tracing::warn!("No card id in detail URL {}", detail_url);
    }

    let mut record = VeteranRecord {
        id,
        name: extract_name(document, selectors),
        operations: extract_operations(document, selectors),
        biography: extract_biography(document, selectors),
        decorations: extract_decorations(document, selectors),
        ..VeteranRecord::default()
    };
    fill_info_fields(&mut record, document, selectors);
    record
}

/// First two non-empty direct children of the title, joined by a space
fn extract_name(document: &Document, selectors: &Selectors) -> String {
    let Some(title) = document.select_first(&selectors.title) else {
        return String::new();
    };

    title
        .children()
        .iter()
        .map(Node::normalized_text)
        .filter(|part| !part.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Birth/death dates and places; the first item per field wins
fn fill_info_fields(record: &mut VeteranRecord, document: &Document, selectors: &Selectors) {
    for item in document.select(&selectors.info_item) {
        let (Some(label), Some(value)) = (
            item.select_first(&selectors.info_label),
            item.select_first(&selectors.info_value),
        ) else {
            continue;
        };

        let Some(field) = classify_label(&label.normalized_text()) else {
            continue;
        };

        let slot = match field {
            InfoField::BirthDate => &mut record.birth_date,
            InfoField::BirthPlace => &mut record.birth_place,
            InfoField::DeathDate => &mut record.death_date,
            InfoField::DeathPlace => &mut record.death_place,
        };

        if slot.is_empty() {
            *slot = value.normalized_text();
        }
    }
}

fn extract_operations(document: &Document, selectors: &Selectors) -> String {
    let Some(list) = document.select_first(&selectors.operations_list) else {
        return String::new();
    };

    let operations: Vec<String> = list
        .select(&selectors.operations_link)
        .iter()
        .map(Node::normalized_text)
        .filter(|op| !op.is_empty())
        .collect();

    operations.join(LIST_SEPARATOR)
}

fn extract_biography(document: &Document, selectors: &Selectors) -> String {
    document
        .select_first(&selectors.biography)
        .and_then(|container| container.select_first(&selectors.biography_paragraph))
        .map(|paragraph| paragraph.normalized_text())
        .unwrap_or_default()
}

fn extract_decorations(document: &Document, selectors: &Selectors) -> String {
    let Some(container) = document.select_first(&selectors.decorations) else {
        return String::new();
    };

    let decorations: Vec<String> = container
        .children()
        .iter()
        .map(|child| decoration_title(child, selectors))
        .filter(|title| !title.is_empty())
        .collect();

    decorations.join(LIST_SEPARATOR)
}

/// The decoration name inside one slider item
///
/// Slider links usually hold `<date><name>`, so the second text-bearing child of
/// the link is preferred, then the link text, then the item text.
fn decoration_title(item: &Node<'_>, selectors: &Selectors) -> String {
    if let Some(link) = item.select_first(&selectors.decoration_link) {
        let texts: Vec<String> = link
            .children()
            .iter()
            .map(Node::normalized_text)
            .filter(|t| !t.is_empty())
            .collect();

        if let Some(second) = texts.get(1) {
            return second.clone();
        }

        let link_text = link.normalized_text();
        if !link_text.is_empty() {
            return link_text;
        }
    }

    normalize_whitespace(&item.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;

    const URL: &str = "https://polkrf.ru/veteran/ivanov-ivan-12345";

    fn extract(html: &str) -> VeteranRecord {
        let selectors = Selectors::compile(&SelectorConfig::default()).unwrap();
        extract_detail(&Document::parse_str(html), URL, &selectors)
    }

    fn info(label: &str, value: &str) -> String {
        format!(
            r#"<div class="b-veteran-info__item"><span class="b-veteran-info__label">{label}</span><span class="b-veteran-info__value">{value}</span></div>"#
        )
    }

    fn full_page() -> String {
        format!(
            r#"<html><body>
            <h1 class="b-veteran-hero__title"><span> Иванов </span>
                <span>Иван</span><span>Иванович</span></h1>
            <div class="b-veteran-info">{}{}{}{}</div>
            <ul class="b-veteran-operations__list">
                <li><a href="/op/1">Битва за  Москву</a></li>
                <li><a href="/op/2"> </a></li>
                <li><a href="/op/3">Курская дуга</a></li>
            </ul>
            <div class="b-veteran-biography">
                <p>Родился в
                   крестьянской семье.</p>
                <p>Второй абзац.</p>
            </div>
            <div class="b-veteran-rewards__slider">
                <div class="slide"><a href="/r/1"><span>1943</span><span>Орден Красной Звезды</span></a></div>
                <div class="slide"><a href="/r/2">Медаль «За отвагу»</a></div>
                <div class="slide"><span>Орден Славы III степени</span></div>
                <div class="slide"> </div>
            </div>
            </body></html>"#,
            info("Дата рождения:", "12.03.1921"),
            info("Место рождения", "  д. Берёзовка,\n Тульская обл. "),
            info("ДАТА СМЕРТИ", "05.05.1995"),
            info("Место гибели", "г. Тула"),
        )
    }

    #[test]
    fn test_full_record() {
        let record = extract(&full_page());
        assert_eq!(
            record,
            VeteranRecord {
                id: "12345".to_string(),
                name: "Иванов Иван".to_string(),
                birth_date: "12.03.1921".to_string(),
                birth_place: "д. Берёзовка, Тульская обл.".to_string(),
                death_date: "05.05.1995".to_string(),
                death_place: "г. Тула".to_string(),
                operations: "Битва за Москву; Курская дуга".to_string(),
                biography: "Родился в крестьянской семье.".to_string(),
                decorations: "Орден Красной Звезды; Медаль «За отвагу»; Орден Славы III степени"
                    .to_string(),
            }
        );
    }

    #[test]
    fn test_empty_page_keeps_only_id() {
        assert_eq!(extract("<html><body></body></html>"), VeteranRecord::with_id("12345"));
    }

    #[test]
    fn test_missing_biography_affects_only_biography() {
        let html = full_page().replace("b-veteran-biography", "something-else");
        let record = extract(&html);
        assert_eq!(record.biography, "");
        assert_eq!(record.name, "Иванов Иван");
        assert_eq!(record.operations, "Битва за Москву; Курская дуга");
        assert_eq!(record.birth_date, "12.03.1921");
    }

    #[test]
    fn test_missing_operations_is_empty_not_separator() {
        let html = r#"<ul class="b-veteran-operations__list"><li><a> </a></li><li><a></a></li></ul>"#;
        assert_eq!(extract(html).operations, "");
    }

    #[test]
    fn test_first_label_match_wins() {
        let html = format!(
            "{}{}{}",
            info("Дата рождения", "1920"),
            info("Дата рождения (по документам)", "1921"),
            info("Место смерти", "Берлин"),
        );
        let record = extract(&html);
        assert_eq!(record.birth_date, "1920");
        assert_eq!(record.death_place, "Берлин");
    }

    #[test]
    fn test_both_death_place_spellings_share_one_field() {
        let html = format!(
            "{}{}",
            info("Место гибели", "Сталинград"),
            info("Место смерти", "Москва"),
        );
        assert_eq!(extract(&html).death_place, "Сталинград");
    }

    #[test]
    fn test_unknown_labels_and_incomplete_items_ignored() {
        let html = format!(
            r#"{}<div class="b-veteran-info__item"><span class="b-veteran-info__label">Дата смерти</span></div>{}"#,
            info("Звание", "Сержант"),
            info("Дата смерти", "1970"),
        );
        let record = extract(&html);
        assert_eq!(record.death_date, "1970");
        assert_eq!(record.birth_date, "");
    }

    #[test]
    fn test_single_fragment_title() {
        let html = r#"<h1 class="b-veteran-hero__title">  Петров Пётр Петрович </h1>"#;
        assert_eq!(extract(html).name, "Петров Пётр Петрович");
    }

    #[test]
    fn test_unknown_id_tolerated() {
        let selectors = Selectors::compile(&SelectorConfig::default()).unwrap();
        let record = extract_detail(
            &Document::parse_str(&full_page()),
            "https://polkrf.ru/veteran/unknown",
            &selectors,
        );
        assert_eq!(record.id, "");
        assert_eq!(record.name, "Иванов Иван");
    }

    #[test]
    fn test_classify_label() {
        assert_eq!(classify_label("Дата рождения:"), Some(InfoField::BirthDate));
        assert_eq!(classify_label("МЕСТО РОЖДЕНИЯ"), Some(InfoField::BirthPlace));
        assert_eq!(classify_label("место гибели"), Some(InfoField::DeathPlace));
        assert_eq!(classify_label("Воинское звание"), None);
    }
}
