use super::{CheckResult, State};
use crate::config::InfotextFormat;
use crate::interface::Attributes;

/// Interface information shown next to the item: alias or descr in brackets, unless the
/// item name already says it all.
pub(super) fn interface_name(
    group_name: Option<&str>,
    item: &str,
    infotext_format: Option<InfotextFormat>,
    attributes: &Attributes,
) -> Option<CheckResult> {
    // Group details follow in the members listing.
    if let Some(group_name) = group_name {
        return Some(CheckResult::summary(State::Ok, group_name));
    }

    let mut info = match infotext_format {
        Some(format) => {
            let bracket = formatted_info(format, attributes);
            if bracket.is_empty() {
                String::new()
            } else {
                format!("[{bracket}]")
            }
        }
        None => default_info(item, attributes),
    };

    if let Some(node) = &attributes.node {
        info = if info.is_empty() {
            format!("On {node}")
        } else {
            format!("{info} on {node}")
        };
    }

    (!info.is_empty()).then(|| CheckResult::summary(State::Ok, info))
}

fn formatted_info(format: InfotextFormat, attributes: &Attributes) -> String {
    let alias = attributes.alias.as_str();
    let descr = attributes.descr.as_str();
    match format {
        InfotextFormat::Alias => alias.to_owned(),
        InfotextFormat::Description => descr.to_owned(),
        InfotextFormat::AliasAndDescription => [alias, descr]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        InfotextFormat::AliasOrDescription if alias.is_empty() => descr.to_owned(),
        InfotextFormat::AliasOrDescription => alias.to_owned(),
        InfotextFormat::DescriptionOrAlias if descr.is_empty() => alias.to_owned(),
        InfotextFormat::DescriptionOrAlias => descr.to_owned(),
    }
}

fn default_info(item: &str, attributes: &Attributes) -> String {
    let alias = attributes.alias.as_str();
    let descr = attributes.descr.as_str();
    let trivial = |name: &str| name.is_empty() || name == item;

    let item_is_index =
        item == attributes.index || item.trim_start_matches('0') == attributes.index;
    if item_is_index && trivial(alias) && trivial(descr) {
        String::new()
    } else if item == format!("{alias} {}", attributes.index) && !descr.is_empty() {
        // Non-unique alias.
        format!("[{alias}/{descr}]")
    } else if !trivial(alias) {
        format!("[{alias}]")
    } else if !trivial(descr) {
        format!("[{descr}]")
    } else {
        format!("[{}]", attributes.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::OperStatus;

    fn attributes(index: &str, descr: &str, alias: &str) -> Attributes {
        Attributes::new(index, descr, alias, OperStatus::Up).unwrap()
    }

    fn text(item: &str, format: Option<InfotextFormat>, attributes: &Attributes) -> Option<String> {
        interface_name(None, item, format, attributes).map(|result| result.text)
    }

    #[test]
    fn test_trivial_description_is_omitted() {
        assert_eq!(text("01", None, &attributes("1", "", "")), None);
        assert_eq!(text("eth0", None, &attributes("eth0", "eth0", "eth0")), None);
    }

    #[test]
    fn test_useful_alias_or_descr_is_shown() {
        assert_eq!(
            text("1", None, &attributes("1", "eth0", "uplink")).as_deref(),
            Some("[uplink]")
        );
        assert_eq!(
            text("uplink", None, &attributes("1", "eth0", "uplink")).as_deref(),
            Some("[eth0]")
        );
        assert_eq!(
            text("eth0", None, &attributes("1", "eth0", "eth0")).as_deref(),
            Some("[1]")
        );
    }

    #[test]
    fn test_non_unique_alias() {
        assert_eq!(
            text("eth 3", None, &attributes("3", "port3", "eth")).as_deref(),
            Some("[eth/port3]")
        );
    }

    #[test]
    fn test_infotext_format() {
        let iface = attributes("1", "eth0", "uplink");
        assert_eq!(
            text("1", Some(InfotextFormat::AliasAndDescription), &iface).as_deref(),
            Some("[uplink, eth0]")
        );
        assert_eq!(
            text("1", Some(InfotextFormat::Description), &iface).as_deref(),
            Some("[eth0]")
        );
        let no_alias = attributes("1", "eth0", "");
        assert_eq!(
            text("1", Some(InfotextFormat::AliasOrDescription), &no_alias).as_deref(),
            Some("[eth0]")
        );
        assert_eq!(text("1", Some(InfotextFormat::Alias), &no_alias), None);
    }

    #[test]
    fn test_node_is_appended() {
        let mut iface = attributes("1", "", "");
        iface.node = Some("node1".to_owned());
        assert_eq!(text("1", None, &iface).as_deref(), Some("On node1"));
        iface.alias = "uplink".to_owned();
        assert_eq!(text("1", None, &iface).as_deref(), Some("[uplink] on node1"));
    }

    #[test]
    fn test_group_name() {
        let result = interface_name(Some("Interface group"), "bond0", None, &attributes("1", "", ""));
        assert_eq!(result, Some(CheckResult::summary(State::Ok, "Interface group")));
    }
}
