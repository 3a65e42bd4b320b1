use callgrind_tree::commands::{annotate_file, AnnotateArgs};
use callgrind_tree::parser::parse_reader;
use callgrind_tree::report::{render_call_tree, render_report};
use callgrind_tree::utils::config::AnnotateConfig;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn render_with(input: &str, config: &AnnotateConfig) -> String {
    let profile = parse_reader(input.as_bytes(), "callgrind.out.test", config).unwrap();
    render_call_tree(&profile, config).unwrap()
}

/// `main -> f1 -> ... -> f{n-1}`, one block per function
fn call_chain(n: usize) -> String {
    let name = |i: usize| if i == 0 { "main".to_string() } else { format!("f{i}") };

    let mut input = String::from("events: Ir\n\n");
    for i in 0..n {
        input.push_str(&format!("fn={}\n1 1\n", name(i)));
        if i + 1 < n {
            input.push_str(&format!("cfn={}\ncalls=1 0\n2 1\n", name(i + 1)));
        }
        input.push('\n');
    }
    input
}

fn rendered_functions(tree: &str) -> Vec<String> {
    tree.lines()
        .filter_map(|line| line.split(" + ").nth(1))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_end_to_end_report() {
    let input = "\
events: Cycles

fn=main
10 100
cfn=foo
calls=1 0
1 50

fn=foo
20 30
";
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(input.as_bytes()).unwrap();

    let args = AnnotateArgs {
        input: file.path().to_path_buf(),
        ..Default::default()
    };
    let report = annotate_file(&args).unwrap();

    let rule = "-".repeat(80);
    let expected = format!(
        "    events: Cycles\n\
         {rule}\n\
         Call stack:\n     150 |  + main()\n      30 |    + foo()\n\
         {rule}\n"
    );
    assert_eq!(report, expected);
}

#[test]
fn test_depth_bound_aborts_long_chain() {
    let tree = render_with(&call_chain(20), &AnnotateConfig::default());

    let functions = rendered_functions(&tree);
    assert_eq!(functions.len(), 17);
    assert_eq!(functions.first().map(String::as_str), Some("main()"));
    assert_eq!(functions.last().map(String::as_str), Some("f16()"));

    let last = tree.lines().last().unwrap();
    assert!(last.contains("ABORT"));
    // The marker sits one level below f16
    assert!(last.starts_with(&format!("{:8} | {}", "", " ".repeat(32))));
    assert!(!tree.contains("f17"));
}

#[test]
fn test_custom_depth_limit() {
    let config = AnnotateConfig::default().with_max_depth(2);
    let tree = render_with(&call_chain(5), &config);

    assert_eq!(rendered_functions(&tree), vec!["main()", "f1()", "f2()"]);
    assert!(tree.contains("ABORT"));
}

#[test]
fn test_short_chain_has_no_abort() {
    let tree = render_with(&call_chain(5), &AnnotateConfig::default());
    assert_eq!(rendered_functions(&tree).len(), 5);
    assert!(!tree.contains("ABORT"));
}

#[test]
fn test_cycle_runs_until_depth_cap() {
    let input = "events: Ir\nfn=main\n1 1\ncfn=b\ncalls=1 0\n2 1\n\nfn=b\n3 1\ncfn=main\ncalls=1 0\n4 1\n";
    let tree = render_with(input, &AnnotateConfig::default());

    let functions = rendered_functions(&tree);
    assert_eq!(functions.len(), 17);
    assert_eq!(&functions[..4], &["main()", "b()", "main()", "b()"]);
    assert!(tree.contains("ABORT"));
}

#[test]
fn test_terminal_truncation_keeps_own_cost() {
    let input = "events: Ir\nfn=main\n1 1\ncfn=memcpy\ncalls=1 0\n2 9\n\n\
                 fn=memcpy\n3 4\ncfn=inner\ncalls=1 0\n4 5\n\nfn=inner\n5 5\n";
    let tree = render_with(input, &AnnotateConfig::default());

    assert_eq!(
        tree,
        "      10 |  + main()\n       9 |    + memcpy()\n"
    );
}

#[test]
fn test_last_write_wins_in_rendering() {
    let input = "events: Ir\nfn=F\n1 10\n\nfn=main\n1 1\ncfn=F\ncalls=1 0\n2 3\n\nfn=F\n2 20\n";
    let tree = render_with(input, &AnnotateConfig::default());

    assert_eq!(tree, "       4 |  + main()\n      20 |    + F()\n");
}

#[test]
fn test_location_suffixes() {
    let input = "\
events: Ir
ob=(1) /usr/bin/app
fl=(1) main.c
fn=(1) main
12 5
cob=(2) /usr/lib/libc.so.6
cfl=(2) ???
cfn=(2) puts
calls=1 0
13 7

ob=(2)
fl=(2)
fn=(2)
0 7
";
    let tree = render_with(input, &AnnotateConfig::default());
    let lines: Vec<&str> = tree.lines().collect();

    assert_eq!(lines[0], "      12 |  + main()           main.c [line 12]");
    assert_eq!(lines[1], "       7 |    + puts()         [/usr/lib/libc.so.6]");
}

#[test]
fn test_missing_root_uses_first_block() {
    let input = "events: Ir\nfn=_start\n1 2\ncfn=helper\ncalls=1 0\n2 3\n\nfn=helper\n3 3\n";
    let tree = render_with(input, &AnnotateConfig::default());
    assert_eq!(rendered_functions(&tree), vec!["_start()", "helper()"]);
}

#[test]
fn test_custom_root() {
    let input = "events: Ir\nfn=main\n1 2\ncfn=helper\ncalls=1 0\n2 3\n\nfn=helper\n3 3\n";
    let config = AnnotateConfig::default().with_root("helper");
    let tree = render_with(input, &config);
    assert_eq!(rendered_functions(&tree), vec!["helper()"]);
}

#[test]
fn test_report_echoes_headers_in_order() {
    let input = "creator: callgrind\ncmd: ./app\nevents: Ir\n\nfn=main\n1 1\n";
    let config = AnnotateConfig::default();
    let profile = parse_reader(input.as_bytes(), "t", &config).unwrap();
    let report = render_report(&profile, &config).unwrap();

    let headers: Vec<&str> = report.lines().take(3).collect();
    assert_eq!(
        headers,
        vec!["   creator: callgrind", "       cmd: ./app", "    events: Ir"]
    );
}
