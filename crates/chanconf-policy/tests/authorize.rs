//! Required policies of computed updates, evaluated end to end.

use chanconf_policy::{required_policies, Evaluator, PolicyPath};
use chanconf_tree::{Config, ConfigGroup, ConfigPolicy, ConfigValue, Policy, SignaturePolicy};
use chanconf_update::compute_update;

fn org(name: &str) -> ConfigGroup {
    let mut org = ConfigGroup::new("Admins");
    org.set_value("MSP", ConfigValue::new("Admins", name.as_bytes().to_vec()));
    org.insert_policy(
        "Admins",
        ConfigPolicy::new("Admins", Policy::signature(format!("OR('{name}MSP.admin')")).unwrap()),
    )
    .unwrap();
    org
}

fn channel() -> Config {
    let mut application = ConfigGroup::new("Admins");
    for name in ["Org1", "Org2", "Org3"] {
        application.insert_group(name, org(name)).unwrap();
    }
    application
        .insert_policy(
            "Admins",
            ConfigPolicy::new("Admins", Policy::implicit_meta("MAJORITY Admins").unwrap()),
        )
        .unwrap();

    let mut root = ConfigGroup::new("Admins");
    root.insert_group("Application", application).unwrap();
    root.insert_policy(
        "Admins",
        ConfigPolicy::new("Admins", Policy::implicit_meta("MAJORITY Admins").unwrap()),
    )
    .unwrap();
    Config::new("mychannel", root)
}

fn signers<'a>(orgs: &'a [&'a str]) -> impl Fn(&PolicyPath, &SignaturePolicy) -> bool + 'a {
    move |path: &PolicyPath, _: &SignaturePolicy| path.group.last().is_some_and(|org| orgs.contains(&org.as_str()))
}

#[test]
fn org_edit_needs_only_that_org() {
    let base = channel();
    let mut updated = base.clone();
    updated
        .channel_group
        .descend_mut(&["Application", "Org2"])
        .unwrap()
        .set_value("MSP", ConfigValue::new("Admins", b"rotated".to_vec()));

    let update = compute_update(&base, &updated).unwrap();
    let required = required_policies(&base.channel_group, &update).unwrap();
    let rendered: Vec<String> = required.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["/Channel/Application/Org2/Admins"]);

    let evaluator = Evaluator::new(&base.channel_group, signers(&["Org2"]));
    assert!(evaluator.unsatisfied(&required).unwrap().is_empty());

    let evaluator = Evaluator::new(&base.channel_group, signers(&["Org1", "Org3"]));
    assert_eq!(evaluator.unsatisfied(&required).unwrap().len(), 1);
}

#[test]
fn adding_an_org_needs_application_majority() {
    let base = channel();
    let mut updated = base.clone();
    updated
        .channel_group
        .descend_mut(&["Application"])
        .unwrap()
        .insert_group("Org4", org("Org4"))
        .unwrap();

    let update = compute_update(&base, &updated).unwrap();
    let required = required_policies(&base.channel_group, &update).unwrap();
    let rendered: Vec<String> = required.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["/Channel/Application/Admins"]);

    let one = Evaluator::new(&base.channel_group, signers(&["Org1"]));
    assert_eq!(one.unsatisfied(&required).unwrap().len(), 1);

    let two = Evaluator::new(&base.channel_group, signers(&["Org1", "Org3"]));
    assert!(two.unsatisfied(&required).unwrap().is_empty());
}
