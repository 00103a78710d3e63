use crate::config::NamingScheme;
use crate::interface::Attributes;

/// An item name and the scheme that actually produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub used_appearance: NamingScheme,
    pub item: String,
}

/// Number of digits of the largest numeric index, used to zero-pad indices so that
/// lexical order equals numeric order. `None` if no index is numeric.
pub fn pad_width<'a>(attributes: impl IntoIterator<Item = &'a Attributes>) -> Option<usize> {
    attributes
        .into_iter()
        .filter_map(|attributes| attributes.index.parse::<u64>().ok())
        .max()
        .map(|max| max.to_string().len())
}

/// Pads `index` with zeros to `width` digits. Non-numeric indices stay as they are.
pub fn padded_index(index: &str, width: Option<usize>) -> String {
    match (width, index.parse::<u64>()) {
        (Some(width), Ok(number)) => format!("{number:0width$}"),
        _ => index.to_owned(),
    }
}

/// Computes the item name of an interface.
///
/// Descr and alias naming fall back to the (padded) index if the attribute is empty.
pub fn compute_item(
    scheme: NamingScheme,
    attributes: &Attributes,
    pad_width: Option<usize>,
) -> ItemInfo {
    match scheme {
        NamingScheme::Descr if !attributes.descr.is_empty() => ItemInfo {
            used_appearance: NamingScheme::Descr,
            item: attributes.descr.clone(),
        },
        NamingScheme::Alias if !attributes.alias.is_empty() => ItemInfo {
            used_appearance: NamingScheme::Alias,
            item: attributes.alias.clone(),
        },
        _ => ItemInfo {
            used_appearance: NamingScheme::Index,
            item: padded_index(&attributes.index, pad_width),
        },
    }
}
