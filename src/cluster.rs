//! Merges the interface sections of several cluster nodes into one section.
use crate::interface::Interface;

/// Flattens per-node sections into one, tagging every interface with its node.
///
/// Nodes are taken in iteration order; the checker falls back to the last node's
/// results if it cannot tell which node is active.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use ifmon::cluster;
/// use ifmon::interface::{Attributes, Counters, Interface, OperStatus};
///
/// let eth0 = Interface::with_counters(
///     Attributes::new("1", "eth0", "eth0", OperStatus::Up).unwrap(),
///     Counters::default(),
/// );
/// let nodes = BTreeMap::from([
///     ("node1".to_owned(), vec![eth0.clone()]),
///     ("node2".to_owned(), vec![eth0]),
/// ]);
/// let section = cluster::reduce(nodes);
/// assert_eq!(section[1].attributes.node.as_deref(), Some("node2"));
/// ```
pub fn reduce(nodes: impl IntoIterator<Item = (String, Vec<Interface>)>) -> Vec<Interface> {
    nodes
        .into_iter()
        .flat_map(|(node, interfaces)| {
            interfaces.into_iter().map(move |mut iface| {
                iface.attributes.node = Some(node.clone());
                iface
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{Attributes, Counters, OperStatus};

    fn iface(index: &str) -> Interface {
        Interface::with_counters(
            Attributes::new(index, "eth", "", OperStatus::Up).unwrap(),
            Counters::default(),
        )
    }

    #[test]
    fn test_reduce_tags_nodes_in_order() {
        let section = reduce(vec![
            ("b".to_owned(), vec![iface("1"), iface("2")]),
            ("a".to_owned(), vec![iface("1")]),
            ("c".to_owned(), Vec::new()),
        ]);
        let tagged: Vec<_> = section
            .iter()
            .map(|iface| {
                (
                    iface.attributes.node.as_deref().unwrap(),
                    iface.attributes.index.as_str(),
                )
            })
            .collect();
        assert_eq!(tagged, vec![("b", "1"), ("b", "2"), ("a", "1")]);
    }

    #[test]
    fn test_node_is_part_of_the_value_store_identity() {
        let section = reduce(vec![
            ("node1".to_owned(), vec![iface("1")]),
            ("node2".to_owned(), vec![iface("1")]),
        ]);
        assert_ne!(
            section[0].attributes.id_for_value_store(),
            section[1].attributes.id_for_value_store()
        );
    }
}
