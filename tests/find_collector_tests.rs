mod common;

use eeschema_collectors::error::Error;
use eeschema_collectors::find_collector::{FindCollectorData, FindPhase, SchFindCollector};
use eeschema_collectors::find_replace::{FindReplaceData, SearchFlags};
use eeschema_collectors::geometry::{Point, Units};
use eeschema_collectors::items::{LibPart, SchItem, SchText, TextKind};
use eeschema_collectors::schematic::Schematic;
use eeschema_collectors::sheet_path::SheetPath;

fn with_flags(find: &str, flags: SearchFlags) -> FindReplaceData {
    FindReplaceData::new(find).with_flags(flags)
}

/// Root sheet with three net labels.
fn three_labels() -> Schematic {
    let mut schematic = Schematic::new();
    let root = schematic.root_screen();
    for (i, name) in ["NET_A", "NET_B", "NET_C"].iter().enumerate() {
        schematic
            .add(
                root,
                SchItem::Text(SchText::new(TextKind::Label, name, Point::new(0, i as i32 * 100))),
            )
            .unwrap();
    }
    schematic
}

#[test]
fn test_idle_until_first_search() {
    let collector = SchFindCollector::default();
    assert_eq!(collector.phase(), FindPhase::Idle);
    assert!(collector.is_search_required(&FindReplaceData::default(), 0));
    assert!(collector.passed_end());
    assert_eq!(collector.current(), None);
}

#[test]
fn test_find_reference_field_with_unit_suffix() {
    let fx = common::build();
    let mut collector = SchFindCollector::default();
    collector
        .collect(&fx.schematic, &FindReplaceData::new("u1a"), None)
        .unwrap();

    assert_eq!(collector.phase(), FindPhase::Navigating);
    assert_eq!(collector.count(), 1);
    let data = collector.get_find_data(0);
    assert_eq!(data.parent(), Some(fx.u1));
    assert_eq!(data.sheet_path(), "/");
    assert_eq!(
        collector.text(&fx.schematic, Units::Mils),
        "Child item Field Reference U1 of parent item Symbol U1A, OPAMP found in sheet /"
    );
}

#[test]
fn test_find_walks_the_hierarchy() {
    let fx = common::build();
    let mut collector = SchFindCollector::default();
    collector
        .collect(&fx.schematic, &FindReplaceData::new("VCC"), None)
        .unwrap();

    assert_eq!(collector.items(), &[fx.vcc_label]);
    assert_eq!(collector.get_find_data(0).sheet_path(), "/Power/");
    assert_eq!(collector.get_find_data(0).parent(), None);
    assert_eq!(collector.sheet_paths().len(), 2);
    assert_eq!(
        collector.text(&fx.schematic, Units::Mils),
        "Item Global Label VCC found in sheet /Power/"
    );
}

#[test]
fn test_scope_limits_search_to_one_sheet() {
    let fx = common::build();
    let root_path = SheetPath::new(fx.schematic.root_sheet());
    let mut collector = SchFindCollector::default();
    collector
        .collect(&fx.schematic, &FindReplaceData::new("VCC"), Some(&root_path))
        .unwrap();
    assert!(collector.is_empty());

    let mut power_path = root_path.clone();
    power_path.push(fx.power_sheet);
    collector
        .collect(&fx.schematic, &FindReplaceData::new("VCC"), Some(&power_path))
        .unwrap();
    assert_eq!(collector.items(), &[fx.vcc_label]);
}

#[test]
fn test_pins_only_with_search_all_pins() {
    let fx = common::build();
    let mut collector = SchFindCollector::default();

    collector
        .collect(&fx.schematic, &FindReplaceData::new("OUT"), None)
        .unwrap();
    assert!(collector.is_empty());

    let flags = SearchFlags {
        search_all_pins: true,
        ..Default::default()
    };
    collector
        .collect(&fx.schematic, &with_flags("OUT", flags), None)
        .unwrap();
    assert_eq!(collector.items(), &[fx.pin_out]);
    let data = collector.get_find_data(0);
    assert_eq!(data.parent(), Some(fx.u1));
    assert_eq!(data.position(), Point::new(2300, 2000));
}

#[test]
fn test_other_fields_need_search_all_fields() {
    let mut fx = common::build();
    fx.schematic
        .add(
            fx.u1,
            SchItem::Field(eeschema_collectors::items::Field::new(
                eeschema_collectors::items::FOOTPRINT_FIELD,
                "SOIC-8",
                Point::new(2000, 2200),
            )),
        )
        .unwrap();

    let mut collector = SchFindCollector::default();
    collector
        .collect(&fx.schematic, &FindReplaceData::new("SOIC"), None)
        .unwrap();
    assert!(collector.is_empty());

    let flags = SearchFlags {
        search_all_fields: true,
        ..Default::default()
    };
    collector
        .collect(&fx.schematic, &with_flags("SOIC", flags), None)
        .unwrap();
    assert_eq!(collector.count(), 1);
}

#[test]
fn test_is_search_required() {
    let mut fx = common::build();
    let criteria = FindReplaceData::new("NET");
    let mut collector = SchFindCollector::default();
    collector.collect(&fx.schematic, &criteria, None).unwrap();
    let hash = fx.schematic.lib_hash();

    assert!(!collector.is_search_required(&criteria, hash));
    assert!(!collector.is_search_required(&criteria.clone().with_replace("BUS"), hash));

    assert!(collector.is_search_required(&FindReplaceData::new("NET_B"), hash));

    let mut case = criteria.clone();
    case.flags.match_case = true;
    assert!(collector.is_search_required(&case, hash));

    let mut wrap = criteria.clone();
    wrap.flags.wrap = !wrap.flags.wrap;
    assert!(collector.is_search_required(&wrap, hash));

    let mut up = criteria.clone();
    up.flags.search_down = false;
    assert!(!collector.is_search_required(&up, hash));

    fx.schematic.add_lib_part(LibPart::new("NEW"));
    assert!(collector.is_search_required(&criteria, fx.schematic.lib_hash()));

    collector.set_force_search(true);
    assert!(collector.is_search_required(&criteria, hash));
}

#[test]
fn test_navigation_wraps() {
    let schematic = three_labels();
    let criteria = FindReplaceData::new("NET");
    let mut collector = SchFindCollector::default();

    let found: Vec<_> = (0..4)
        .map(|_| collector.find_next(&schematic, &criteria, None).unwrap())
        .collect();
    let items = collector.items().to_vec();
    assert_eq!(items.len(), 3);
    assert_eq!(
        found,
        vec![Some(items[0]), Some(items[1]), Some(items[2]), Some(items[0])]
    );
    assert_eq!(collector.found_index(), 0);
}

#[test]
fn test_navigation_without_wrap_passes_end() {
    let schematic = three_labels();
    let criteria = with_flags(
        "NET",
        SearchFlags {
            wrap: false,
            ..Default::default()
        },
    );
    let mut collector = SchFindCollector::default();

    for expected in 0..3 {
        let found = collector.find_next(&schematic, &criteria, None).unwrap();
        assert_eq!(found, collector.get(expected));
    }
    assert_eq!(collector.find_next(&schematic, &criteria, None).unwrap(), None);
    assert!(collector.passed_end());
    assert_eq!(collector.found_index(), 3);

    collector.update_index();
    assert_eq!(collector.found_index(), 3);
}

#[test]
fn test_navigation_upwards() {
    let schematic = three_labels();
    let criteria = with_flags(
        "NET",
        SearchFlags {
            search_down: false,
            ..Default::default()
        },
    );
    let mut collector = SchFindCollector::default();

    collector.collect(&schematic, &criteria, None).unwrap();
    assert_eq!(collector.found_index(), 2);
    collector.update_index();
    collector.update_index();
    assert_eq!(collector.found_index(), 0);
    collector.update_index();
    assert_eq!(collector.found_index(), 2);
}

#[test]
fn test_empty_result_stays_at_zero() {
    let schematic = three_labels();
    let criteria = FindReplaceData::new("ZZZ");
    let mut collector = SchFindCollector::default();

    assert_eq!(collector.find_next(&schematic, &criteria, None).unwrap(), None);
    collector.update_index();
    assert_eq!(collector.found_index(), 0);
    assert!(collector.passed_end());
    assert_eq!(collector.get_find_data(0), FindCollectorData::default());
    assert_eq!(collector.text(&schematic, Units::Mils), "");
}

#[test]
fn test_set_found_index_out_of_range() {
    let schematic = three_labels();
    let mut collector = SchFindCollector::default();
    collector
        .collect(&schematic, &FindReplaceData::new("NET"), None)
        .unwrap();

    collector.set_found_index(2);
    assert_eq!(collector.found_index(), 2);
    collector.set_found_index(99);
    assert_eq!(collector.found_index(), 0);
    collector.set_found_index(-1);
    assert_eq!(collector.found_index(), 0);
}

#[test]
fn test_replace_removes_match() {
    let mut fx = common::build();
    let criteria = FindReplaceData::new("NET_A").with_replace("SIG_A");
    let mut collector = SchFindCollector::default();
    collector.collect(&fx.schematic, &criteria, None).unwrap();
    assert_eq!(collector.items(), &[fx.label]);

    assert!(collector.replace_item(&mut fx.schematic, None));
    match fx.schematic.item(fx.label) {
        Some(SchItem::Text(text)) => assert_eq!(text.text, "SIG_A"),
        other => panic!("Unexpected item {:?}", other),
    }
    assert!(collector.is_empty());
    assert_eq!(collector.found_index(), 0);
    assert!(collector.is_search_required(&criteria, fx.schematic.lib_hash()));

    collector.collect(&fx.schematic, &criteria, None).unwrap();
    assert!(collector.is_empty());
}

#[test]
fn test_replace_keeps_match_that_still_matches() {
    let mut schematic = three_labels();
    let criteria = FindReplaceData::new("NET").with_replace("NET_NET");
    let mut collector = SchFindCollector::default();
    collector.collect(&schematic, &criteria, None).unwrap();

    assert!(collector.replace_item(&mut schematic, None));
    assert_eq!(collector.count(), 3);
    let first = collector.get(0).unwrap();
    match schematic.item(first) {
        Some(SchItem::Text(text)) => assert_eq!(text.text, "NET_NET_A"),
        other => panic!("Unexpected item {:?}", other),
    }
}

#[test]
fn test_replace_reference_needs_flag() {
    let mut fx = common::build();
    let criteria = FindReplaceData::new("U1").with_replace("U7");
    let mut collector = SchFindCollector::default();
    collector.collect(&fx.schematic, &criteria, None).unwrap();
    assert_eq!(collector.count(), 1);
    assert!(!collector.replace_item(&mut fx.schematic, None));

    let criteria = with_flags(
        "U1",
        SearchFlags {
            replace_references: true,
            ..Default::default()
        },
    )
    .with_replace("U7");
    collector.collect(&fx.schematic, &criteria, None).unwrap();
    assert!(collector.replace_item(&mut fx.schematic, None));
    assert_eq!(fx.schematic.component_reference(fx.u1).as_deref(), Some("U7A"));
    assert!(collector.is_empty());
}

#[test]
fn test_replace_outside_scope_is_refused() {
    let mut fx = common::build();
    let criteria = FindReplaceData::new("VCC").with_replace("VDD");
    let mut collector = SchFindCollector::default();
    collector.collect(&fx.schematic, &criteria, None).unwrap();

    let root_path = SheetPath::new(fx.schematic.root_sheet());
    assert!(!collector.replace_item(&mut fx.schematic, Some(&root_path)));

    let mut power_path = root_path.clone();
    power_path.push(fx.power_sheet);
    assert!(collector.replace_item(&mut fx.schematic, Some(&power_path)));
}

#[test]
fn test_pins_are_not_replaceable() {
    let mut fx = common::build();
    let criteria = with_flags(
        "OUT",
        SearchFlags {
            search_all_pins: true,
            ..Default::default()
        },
    )
    .with_replace("OUTPUT");
    let mut collector = SchFindCollector::default();
    collector.collect(&fx.schematic, &criteria, None).unwrap();
    assert_eq!(collector.count(), 1);
    assert!(!collector.replace_item(&mut fx.schematic, None));
}

#[test]
fn test_regex_and_wildcards() {
    let mut schematic = three_labels();
    let mut collector = SchFindCollector::default();

    let wildcard = with_flags(
        "NET_?",
        SearchFlags {
            wildcards: true,
            whole_word: true,
            ..Default::default()
        },
    );
    collector.collect(&schematic, &wildcard, None).unwrap();
    assert_eq!(collector.count(), 3);

    let whole = with_flags(
        "NET",
        SearchFlags {
            whole_word: true,
            ..Default::default()
        },
    );
    collector.collect(&schematic, &whole, None).unwrap();
    assert!(collector.is_empty());

    let regex = with_flags(
        r"NET_(\w)",
        SearchFlags {
            regex: true,
            match_case: true,
            ..Default::default()
        },
    )
    .with_replace("BUS_$1");
    collector.collect(&schematic, &regex, None).unwrap();
    assert_eq!(collector.count(), 3);
    let first = collector.get(0).unwrap();
    assert!(collector.replace_item(&mut schematic, None));
    match schematic.item(first) {
        Some(SchItem::Text(text)) => assert_eq!(text.text, "BUS_A"),
        other => panic!("Unexpected item {:?}", other),
    }
}

#[test]
fn test_invalid_regex_is_an_error() {
    let schematic = three_labels();
    let mut collector = SchFindCollector::default();
    let criteria = with_flags(
        "(",
        SearchFlags {
            regex: true,
            ..Default::default()
        },
    );

    let result = collector.collect(&schematic, &criteria, None);
    assert!(matches!(result, Err(Error::InvalidPattern(_))));
    assert!(collector.is_empty());
    assert_eq!(collector.phase(), FindPhase::Idle);
}

#[test]
fn test_current_sheet_only() {
    let fx = common::build();
    let mut power_path = SheetPath::new(fx.schematic.root_sheet());
    power_path.push(fx.power_sheet);
    let root_path = SheetPath::new(fx.schematic.root_sheet());

    let criteria = with_flags(
        "R1",
        SearchFlags {
            current_sheet_only: true,
            ..Default::default()
        },
    );
    let mut collector = SchFindCollector::default();
    assert_eq!(
        collector
            .find_next(&fx.schematic, &criteria, Some(&root_path))
            .unwrap(),
        None
    );

    collector.set_force_search(true);
    let found = collector
        .find_next(&fx.schematic, &criteria, Some(&power_path))
        .unwrap();
    assert!(found.is_some());
    assert_eq!(collector.get_find_data(0).parent(), Some(fx.r1));
}

fn label_text(schematic: &Schematic, id: eeschema_collectors::schematic::ItemId) -> String {
    match schematic.item(id) {
        Some(SchItem::Text(text)) => text.text.clone(),
        other => panic!("Unexpected item {:?}", other),
    }
}

#[test]
fn test_changed_replace_string_reaches_replace() {
    let mut fx = common::build();
    let mut collector = SchFindCollector::default();

    let found = collector
        .find_next(&fx.schematic, &FindReplaceData::new("NET_A"), None)
        .unwrap();
    assert_eq!(found, Some(fx.label));

    // Only the replace string changed: results are reused, not collected again.
    let criteria = FindReplaceData::new("NET_A").with_replace("SIG_A");
    assert!(!collector.is_search_required(&criteria, fx.schematic.lib_hash()));
    let found = collector.find_next(&fx.schematic, &criteria, None).unwrap();
    assert_eq!(found, Some(fx.label));
    assert_eq!(collector.find_replace_data().replace_string, "SIG_A");

    assert!(collector.replace_item(&mut fx.schematic, None));
    assert_eq!(label_text(&fx.schematic, fx.label), "SIG_A");
}

#[test]
fn test_replace_loop_visits_each_match_once() {
    let mut schematic = three_labels();
    let criteria = FindReplaceData::new("NET").with_replace("NET_NET");
    let mut collector = SchFindCollector::default();
    collector.collect(&schematic, &criteria, None).unwrap();
    let items = collector.items().to_vec();

    let mut iterations = 0;
    while collector.replace_item(&mut schematic, None) {
        iterations += 1;
        assert!(iterations <= 3, "Replacement loop did not terminate");
    }
    assert_eq!(iterations, 3);
    let texts: Vec<_> = items.iter().map(|id| label_text(&schematic, *id)).collect();
    assert_eq!(texts, vec!["NET_NET_A", "NET_NET_B", "NET_NET_C"]);
}

#[test]
fn test_replace_all_replaces_each_match_once() {
    let mut schematic = three_labels();
    let mut collector = SchFindCollector::default();

    let grow = FindReplaceData::new("NET").with_replace("NET_NET");
    collector.collect(&schematic, &grow, None).unwrap();
    let items = collector.items().to_vec();
    assert_eq!(collector.replace_all(&mut schematic, None), 3);
    assert_eq!(collector.count(), 3);
    assert_eq!(label_text(&schematic, items[2]), "NET_NET_C");

    let shrink = FindReplaceData::new("NET_NET_").with_replace("N");
    collector.collect(&schematic, &shrink, None).unwrap();
    assert_eq!(collector.replace_all(&mut schematic, None), 3);
    assert!(collector.is_empty());
    assert_eq!(label_text(&schematic, items[0]), "NA");
}

#[test]
fn test_replace_all_with_kept_and_dropped_matches() {
    let mut schematic = Schematic::new();
    let root = schematic.root_screen();
    let labels: Vec<_> = ["AA", "AB", "AA", "AB"]
        .iter()
        .map(|text| {
            schematic
                .add(root, SchItem::Text(SchText::new(TextKind::Label, text, Point::ZERO)))
                .unwrap()
        })
        .collect();

    // "AA" keeps matching after the replacement, "AB" does not.
    let criteria = FindReplaceData::new("A").with_replace("");
    let mut collector = SchFindCollector::default();
    collector.collect(&schematic, &criteria, None).unwrap();
    assert_eq!(collector.replace_all(&mut schematic, None), 4);

    let texts: Vec<_> = labels.iter().map(|id| label_text(&schematic, *id)).collect();
    assert_eq!(texts, vec!["A", "B", "A", "B"]);
    assert_eq!(collector.items(), &[labels[0], labels[2]]);
}

#[test]
fn test_replace_all_skips_unreplaceable_matches() {
    let mut fx = common::build();
    let criteria = with_flags(
        "1",
        SearchFlags {
            search_all_pins: true,
            ..Default::default()
        },
    )
    .with_replace("7");
    let mut collector = SchFindCollector::default();
    collector.collect(&fx.schematic, &criteria, None).unwrap();
    let before = collector.count();
    assert!(before > 1);

    // Reference fields and pins stay untouched, the value "10k" is rewritten.
    let replaced = collector.replace_all(&mut fx.schematic, None);
    assert_eq!(replaced, 1);
    assert_eq!(fx.schematic.component_reference(fx.u1).as_deref(), Some("U1A"));
}

#[test]
fn test_sheet_found_by_file_name_is_replaceable() {
    let mut fx = common::build();
    let criteria = FindReplaceData::new("power.sch").with_replace("supply.sch");
    let mut collector = SchFindCollector::default();
    collector.collect(&fx.schematic, &criteria, None).unwrap();
    assert_eq!(collector.items(), &[fx.power_sheet]);

    assert!(collector.replace_item(&mut fx.schematic, None));
    match fx.schematic.item(fx.power_sheet) {
        Some(SchItem::Sheet(sheet)) => {
            assert_eq!(sheet.name, "Power");
            assert_eq!(sheet.file_name, "supply.sch");
        }
        other => panic!("Unexpected item {:?}", other),
    }
    assert!(collector.is_empty());
}
