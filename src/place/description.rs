//! Text description generation for places.
//!
//! The output is embedded and indexed downstream, so its exact bytes matter:
//! paragraph order, default strings, rounding and separators are fixed.

use super::PlaceRecord;

/// One gated paragraph. `None` means the source field is absent.
type Paragraph = fn(&PlaceRecord) -> Option<String>;

/// Paragraphs in output order. Each is gated only by its own fields.
const PARAGRAPHS: [Paragraph; 7] = [
    header,
    categories,
    rating,
    price_level,
    editorial_summary,
    llm_description,
    llm_tags,
];

/// Labels for price levels 0 through 4.
const PRICE_LABELS: [&str; 5] = [
    "Free or very cheap (under $10)",
    "Inexpensive ($10-25)",
    "Moderate ($25-50)",
    "Expensive ($50-100)",
    "Very expensive (over $100)",
];

/// Generate the description for a place.
///
/// Paragraphs carry their own leading newlines and are concatenated directly.
pub fn describe(place: &PlaceRecord) -> String {
    PARAGRAPHS
        .iter()
        .filter_map(|paragraph| paragraph(place))
        .collect()
}

/// Label for a price level; anything outside 0..=4 is "Price unknown".
pub fn price_label(level: i64) -> &'static str {
    usize::try_from(level)
        .ok()
        .and_then(|i| PRICE_LABELS.get(i))
        .copied()
        .unwrap_or("Price unknown")
}

/// Format an integer with comma thousands separators (12000 -> "12,000").
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn non_empty_list(value: &Option<Vec<String>>) -> Option<&[String]> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn header(place: &PlaceRecord) -> Option<String> {
    let state = place.state.as_deref().unwrap_or("");
    let city = place.city.as_deref().unwrap_or("");
    let joined = format!("{} {}", state, city);
    let location = match joined.trim() {
        "" => "Unknown location",
        trimmed => trimmed,
    };
    let category = non_empty(&place.primary_category).unwrap_or("attraction");

    Some(format!("{} is a {} in {}.", place.name, category, location))
}

fn categories(place: &PlaceRecord) -> Option<String> {
    non_empty_list(&place.google_types)
        .map(|types| format!("\nGoogle Categories: {}", types.join(", ")))
}

fn rating(place: &PlaceRecord) -> Option<String> {
    let rating = place.rating?;
    let reviews = match place.reviews_count {
        Some(count) if count > 0 => format!(" ({} reviews)", group_thousands(count)),
        _ => String::new(),
    };
    Some(format!("\nRating: {:.2}{}", rating, reviews))
}

fn price_level(place: &PlaceRecord) -> Option<String> {
    place
        .price_level
        .map(|level| format!("\nPrice Level: {}", price_label(level)))
}

fn editorial_summary(place: &PlaceRecord) -> Option<String> {
    non_empty(&place.editorial_summary).map(|summary| format!("\n\nSummary: {}", summary))
}

fn llm_description(place: &PlaceRecord) -> Option<String> {
    non_empty(&place.llm_description).map(|text| format!("\n\nDescription: {}", text))
}

fn llm_tags(place: &PlaceRecord) -> Option<String> {
    non_empty_list(&place.llm_tags).map(|tags| format!("\n\nSuitable for: {}", tags.join(", ")))
}
