use proptest::prelude::*;
use sankeyflow::logs::LOG_BROADCASTER;
use sankeyflow::{
    build_sankey, combine_categories, count_paths, qualify_labels, BuiltinPalettes, Cell, EdgeWindow, LabelCatalog,
    LinkColoring, PipelineOptions, Table,
};

const MAX_STAGES: usize = 5;
const MAX_ROWS: usize = 40;
const GRADES: &[&str] = &["A", "B", "C", "D", "F"];

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop::option::weighted(0.8, prop::sample::select(GRADES).prop_map(str::to_string))
}

fn table_strategy() -> impl Strategy<Value = Table> {
    (1usize..=MAX_STAGES)
        .prop_flat_map(|stages| prop::collection::vec(prop::collection::vec(cell_strategy(), stages), 1..=MAX_ROWS))
        .prop_map(|rows| {
            let stages = rows[0].len();
            let names = (1..=stages).map(|i| format!("Course{}", i)).collect();
            Table::new(names, rows).expect("rows share one width")
        })
}

fn quiet() {
    LOG_BROADCASTER.set_echo(false);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn path_counts_cover_every_row(table in table_strategy()) {
        let paths = count_paths(&table);

        prop_assert_eq!(paths.total_count(), table.row_count());
        prop_assert!(paths.paths.iter().all(|p| p.count >= 1));
        prop_assert!(paths.paths.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn catalog_indices_round_trip(table in table_strategy()) {
        let mut paths = count_paths(&table);
        qualify_labels(&mut paths, "_").unwrap();
        let catalog = LabelCatalog::from_paths(&paths);

        for (i, label) in catalog.labels().iter().enumerate() {
            prop_assert_eq!(catalog.index_of(label), Some(i));
            prop_assert_eq!(catalog.label(i), Some(label.as_str()));
        }

        let indexed = catalog.index_paths(&paths).unwrap();
        for (path, ip) in paths.paths.iter().zip(&indexed.paths) {
            let labels: Vec<&str> = ip.present().into_iter().map(|i| catalog.labels()[i].as_str()).collect();
            let expected: Vec<&str> = path.present().collect();
            prop_assert_eq!(labels, expected);
        }
    }

    #[test]
    fn link_count_follows_edge_window(table in table_strategy(), legacy in any::<bool>()) {
        quiet();
        let window = if legacy { EdgeWindow::Legacy } else { EdgeWindow::Full };
        let options = PipelineOptions { edge_window: window, ..PipelineOptions::default() };
        let result = build_sankey(table, &options, &BuiltinPalettes).unwrap();

        let expected: usize = result.indexed.paths.iter().map(|p| window.edge_count(p.present().len())).sum();
        prop_assert_eq!(result.links.len(), expected);

        let weight: usize = result.links.edges.iter().map(|e| e.value).sum();
        let expected_weight: usize = result
            .indexed
            .paths
            .iter()
            .map(|p| p.count * window.edge_count(p.present().len()))
            .sum();
        prop_assert_eq!(weight, expected_weight);

        prop_assert!(result.links.edges.iter().all(|e| e.source < result.catalog.len() && e.target < result.catalog.len()));
    }

    #[test]
    fn colored_run_is_deterministic(table in table_strategy()) {
        quiet();
        let options = PipelineOptions {
            coloring: Some(LinkColoring::default()),
            node_colors: true,
            ..PipelineOptions::default()
        };

        let first = build_sankey(table.clone(), &options, &BuiltinPalettes).unwrap();
        let second = build_sankey(table, &options, &BuiltinPalettes).unwrap();

        prop_assert_eq!(&first.diagram, &second.diagram);
        prop_assert_eq!(first.links.colors.as_ref().map(Vec::len), Some(first.links.len()));
        prop_assert_eq!(first.node_colors.as_ref().map(Vec::len), Some(first.catalog.len()));
        prop_assert!(first.diagram.checked_figure().is_ok());
    }

    #[test]
    fn combined_members_are_replaced(mut table in table_strategy()) {
        let combine = vec!["AB".to_string(), "DF".to_string()];
        let group = vec!["A".to_string(), "F".to_string()];
        let before = table.clone();

        combine_categories(&mut table, &combine, &group).unwrap();

        for (old, new) in before.rows().iter().zip(table.rows()) {
            for (o, n) in old.iter().zip(new) {
                match o.as_deref() {
                    None => prop_assert!(n.is_none()),
                    Some("A") | Some("B") => prop_assert_eq!(n.as_deref(), Some("A")),
                    Some("D") | Some("F") => prop_assert_eq!(n.as_deref(), Some("F")),
                    Some(other) => prop_assert_eq!(n.as_deref(), Some(other)),
                }
            }
        }
    }
}
