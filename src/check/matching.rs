use crate::config::NamingScheme;
use crate::interface::Interface;

/// Finds the interfaces an item refers to: at most one per cluster node.
///
/// An item matches by its (possibly zero padded) index, its alias, or its descr, and
/// otherwise by the compound forms `"alias index"` and `"descr index"`. With a known
/// `appearance` only that naming scheme is tried.
pub fn matching_interfaces_for_item<'a>(
    item: &str,
    section: &'a [Interface],
    appearance: Option<NamingScheme>,
) -> Vec<&'a Interface> {
    let Some(first) = section.first() else {
        return Vec::new();
    };
    if first.attributes.node.is_none() {
        return matching_interface(item, section.iter(), appearance)
            .into_iter()
            .collect();
    }

    let mut clustered: Vec<&Interface> = section.iter().collect();
    clustered.sort_by(|a, b| a.attributes.node.cmp(&b.attributes.node));
    clustered
        .chunk_by(|a, b| a.attributes.node == b.attributes.node)
        .filter_map(|node_interfaces| {
            matching_interface(item, node_interfaces.iter().copied(), appearance)
        })
        .collect()
}

fn matching_interface<'a, I>(
    item: &str,
    mut interfaces: I,
    appearance: Option<NamingScheme>,
) -> Option<&'a Interface>
where
    I: Iterator<Item = &'a Interface> + Clone,
{
    interfaces
        .clone()
        .find(|iface| matches_simple_item(item, iface, appearance))
        .or_else(|| interfaces.find(|iface| matches_compound_item(item, iface, appearance)))
}

fn uses(appearance: Option<NamingScheme>, scheme: NamingScheme) -> bool {
    appearance.is_none_or(|appearance| appearance == scheme)
}

fn matches_simple_item(item: &str, iface: &Interface, appearance: Option<NamingScheme>) -> bool {
    let attributes = &iface.attributes;
    let index_matches = item.trim_start_matches('0') == attributes.index
        || (item.chars().all(|c| c == '0') && attributes.index.parse::<i64>().unwrap_or(0) == 0);
    (uses(appearance, NamingScheme::Index) && index_matches)
        || (uses(appearance, NamingScheme::Alias) && item == attributes.alias)
        || (uses(appearance, NamingScheme::Descr) && item == attributes.descr)
}

fn matches_compound_item(item: &str, iface: &Interface, appearance: Option<NamingScheme>) -> bool {
    let attributes = &iface.attributes;
    (uses(appearance, NamingScheme::Alias)
        && item == format!("{} {}", attributes.alias, attributes.index))
        || (uses(appearance, NamingScheme::Descr)
            && item == format!("{} {}", attributes.descr, attributes.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{Attributes, Counters, OperStatus};

    fn iface(index: &str, descr: &str, alias: &str) -> Interface {
        Interface::with_counters(
            Attributes::new(index, descr, alias, OperStatus::Up).unwrap(),
            Counters::default(),
        )
    }

    fn indices(matches: &[&Interface]) -> Vec<String> {
        matches
            .iter()
            .map(|iface| {
                format!(
                    "{}@{}",
                    iface.attributes.index,
                    iface.attributes.node.as_deref().unwrap_or("-")
                )
            })
            .collect()
    }

    #[test]
    fn test_match_by_padded_index() {
        let section = [iface("1", "eth0", "lan"), iface("12", "eth1", "wan")];
        assert_eq!(indices(&matching_interfaces_for_item("01", &section, None)), vec!["1@-"]);
        assert_eq!(
            indices(&matching_interfaces_for_item("12", &section, Some(NamingScheme::Index))),
            vec!["12@-"]
        );
        assert!(matching_interfaces_for_item("3", &section, None).is_empty());
    }

    #[test]
    fn test_all_zero_item_matches_index_zero() {
        let section = [iface("0", "lo", "lo")];
        assert_eq!(indices(&matching_interfaces_for_item("00", &section, None)), vec!["0@-"]);
    }

    #[test]
    fn test_match_respects_appearance() {
        let section = [iface("1", "eth0", "lan")];
        assert_eq!(matching_interfaces_for_item("lan", &section, None).len(), 1);
        assert_eq!(
            matching_interfaces_for_item("lan", &section, Some(NamingScheme::Alias)).len(),
            1
        );
        assert!(matching_interfaces_for_item("lan", &section, Some(NamingScheme::Descr)).is_empty());
        assert!(matching_interfaces_for_item("1", &section, Some(NamingScheme::Alias)).is_empty());
    }

    #[test]
    fn test_match_compound_items() {
        let section = [iface("3", "port3", "eth"), iface("7", "port7", "eth")];
        assert_eq!(indices(&matching_interfaces_for_item("eth 7", &section, None)), vec!["7@-"]);
        assert_eq!(
            indices(&matching_interfaces_for_item("port3 3", &section, Some(NamingScheme::Descr))),
            vec!["3@-"]
        );
        assert!(
            matching_interfaces_for_item("port3 3", &section, Some(NamingScheme::Alias)).is_empty()
        );
    }

    #[test]
    fn test_clustered_section_matches_once_per_node() {
        let section = crate::cluster::reduce(vec![
            ("node2".to_owned(), vec![iface("1", "eth0", "lan"), iface("2", "eth1", "lan")]),
            ("node1".to_owned(), vec![iface("1", "eth0", "lan")]),
        ]);
        assert_eq!(
            indices(&matching_interfaces_for_item("lan", &section, None)),
            vec!["1@node1", "1@node2"]
        );
    }
}
