use super::*;
use crate::test_support::{article, comment, theme};

fn titles(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.title.as_str()).collect()
}

// =============================================================================
// DEDUPE
// =============================================================================

#[test]
fn first_occurrence_wins() {
    let themes = vec![theme(1, "A"), theme(1, "A-dup"), theme(2, "B")];
    let out = dedupe(themes);
    let names: Vec<_> = out.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn relative_order_is_preserved() {
    let themes = vec![theme(3, "C"), theme(1, "A"), theme(3, "C2"), theme(2, "B"), theme(1, "A2")];
    let ids: Vec<_> = dedupe(themes).iter().filter_map(|t| t.id).collect();
    assert_eq!(ids, [3, 1, 2]);
}

#[test]
fn themes_without_id_fall_back_to_slug_then_name() {
    let slugged = Theme { id: None, slug: Some("rust".into()), name: "Rust".into(), ..Theme::default() };
    let slug_dup = Theme { name: "Rust again".into(), ..slugged.clone() };
    let named = Theme { id: None, name: "Go".into(), ..Theme::default() };
    let named_dup = Theme { description: "other".into(), ..named.clone() };

    let out = dedupe(vec![slugged, slug_dup, named, named_dup]);
    let names: Vec<_> = out.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Rust", "Go"]);
}

#[test]
fn articles_without_id_or_slug_use_title_and_date() {
    let bare = |title: &str, date: &str| Article { id: None, ..article(0, title, date) };
    let out = dedupe(vec![
        bare("Hello", "2024-01-01"),
        bare("Hello", "2024-01-01"),
        bare("Hello", "2024-02-01"),
    ]);
    assert_eq!(out.len(), 2);
}

#[test]
fn id_and_slug_keys_never_collide() {
    let by_id = article(1, "one", "2024-01-01");
    let by_slug = Article { id: None, slug: Some("1".into()), ..article(0, "slug", "2024-01-01") };
    assert_eq!(dedupe(vec![by_id, by_slug]).len(), 2);
}

#[test]
fn comments_dedupe_by_id() {
    let out = dedupe(vec![comment(1, 5, "2024-01-01"), comment(1, 5, "2024-01-02"), comment(2, 5, "2024-01-03")]);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].created_at, Some("2024-01-01".into()));
}

// =============================================================================
// SORT
// =============================================================================

#[test]
fn descending_by_default_and_toggle_reverses() {
    let source = vec![
        article(1, "jan", "2024-01-01"),
        article(2, "mar", "2024-03-01"),
        article(3, "feb", "2024-02-01"),
    ];

    let order = SortOrder::default();
    assert_eq!(order, SortOrder::Desc);
    assert_eq!(titles(&sorted_by_created(&source, order)), ["mar", "feb", "jan"]);

    let order = order.toggled();
    assert_eq!(titles(&sorted_by_created(&source, order)), ["jan", "feb", "mar"]);
    assert_eq!(order.toggled(), SortOrder::Desc);
}

#[test]
fn missing_and_unparseable_dates_sort_as_oldest() {
    let mut items = vec![
        Article { created_at: None, ..article(1, "none", "") },
        article(2, "new", "2024-05-01T10:00:00Z"),
        article(3, "junk", "not a date"),
    ];
    sort_by_created(&mut items, SortOrder::Desc);
    assert_eq!(titles(&items), ["new", "none", "junk"]);
}

#[test]
fn equal_timestamps_keep_source_order() {
    let source = vec![
        article(1, "a", "2024-01-01"),
        article(2, "b", "2024-01-01"),
        article(3, "c", "2024-01-01"),
    ];
    assert_eq!(titles(&sorted_by_created(&source, SortOrder::Desc)), ["a", "b", "c"]);
    assert_eq!(titles(&sorted_by_created(&source, SortOrder::Asc)), ["a", "b", "c"]);
}

#[test]
fn mixed_millis_and_text_timestamps_compare() {
    let mut items = vec![
        Article { created_at: Some(Timestamp::Millis(1_704_067_200_000)), ..article(1, "millis-2024", "") },
        article(2, "text-2023", "2023-06-01"),
    ];
    sort_by_created(&mut items, SortOrder::Asc);
    assert_eq!(titles(&items), ["text-2023", "millis-2024"]);
}

#[test]
fn sort_order_display() {
    assert_eq!(SortOrder::Asc.to_string(), "asc");
    assert_eq!(SortOrder::Desc.to_string(), "desc");
}
