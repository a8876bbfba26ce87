//! Normalization from raw Notion rows to [`shipmates_core::CourierRecord`].

use shipmates_core::CourierRecord;

use crate::error::NotionError;
use crate::types::CourierPage;

/// Converts one courier row into a [`CourierRecord`].
///
/// The name is the concatenated plain text of the title property. The logo
/// is the first attached file, whether uploaded or linked. Price columns
/// are copied as-is; an empty cell stays `None`.
///
/// # Errors
///
/// Returns [`NotionError::InvalidRecord`] if the row has no non-blank name.
pub fn normalize_courier(page: CourierPage) -> Result<CourierRecord, NotionError> {
    let props = page.properties;

    let name = props
        .name
        .map(|t| {
            t.title
                .into_iter()
                .map(|rt| rt.plain_text)
                .collect::<String>()
        })
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| NotionError::InvalidRecord {
            id: page.id.clone(),
            reason: "missing Name".into(),
        })?;

    let logo_url = props
        .logo
        .and_then(|l| l.files.into_iter().next())
        .and_then(|f| f.file.or(f.external))
        .map(|u| u.url);

    Ok(CourierRecord {
        id: page.id,
        name,
        logo_url,
        metro_price: props.metro_price.and_then(|p| p.number),
        outside_metro_price: props.outside_metro_price.and_then(|p| p.number),
    })
}
