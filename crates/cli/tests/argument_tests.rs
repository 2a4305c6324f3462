#[cfg(test)]
mod tests {
    use clap::Parser;
    use cmdchain_cli::arguments::{
        apply_assignments, collect_assignments, parse_assignment, resolve_target, Target,
    };
    use cmdchain_cli::cli_args::{Action, Args, RunOptions};
    use cmdchain_cli::selection::suggest_block_id;
    use cmdchain_core::assembler::assemble;
    use cmdchain_core::error::Error;
    use cmdchain_core::file_handling::load_definitions;
    use cmdchain_core::instance::InstanceId;
    use cmdchain_core::workspace::Workspace;

    const BLOCKS: &str = r"
blocks:
  - id: ocr_stage1
    title: OCR
    command: python batchocr/ocr_tests.py
    flags:
      - key: input
        label: Input file
        long: --input
        takes_value: true
      - key: jpeg-quality
        label: JPEG quality
        long: --jpeg-quality
        takes_value: true
        default: 70
  - id: cleanup_stage2
    title: Cleanup
    command: python cleanocr/cleanup_tests.py
    flags:
      - key: keep-original
        label: Keep original
        long: --keep-original
";

    fn linked_chain() -> (Workspace, Vec<InstanceId>) {
        let mut workspace = Workspace::new(load_definitions(BLOCKS).unwrap());
        let ocr = workspace.spawn("ocr_stage1").unwrap();
        let cleanup = workspace.spawn("cleanup_stage2").unwrap();
        workspace.link(ocr, cleanup).unwrap();
        (workspace, vec![ocr, cleanup])
    }

    #[test]
    fn test_parse_assignment() {
        let assignment = parse_assignment("ocr_stage1.input=scan.pdf", true).unwrap();
        assert_eq!(assignment.target, Target::Block("ocr_stage1".to_string()));
        assert_eq!(assignment.flag, "input");
        assert_eq!(assignment.value.as_deref(), Some("scan.pdf"));

        // Only the first `=` separates the value
        let assignment = parse_assignment("1.filter=a=b", true).unwrap();
        assert_eq!(assignment.target, Target::Position(1));
        assert_eq!(assignment.value.as_deref(), Some("a=b"));

        // An empty value is allowed
        let assignment = parse_assignment("1.input=", true).unwrap();
        assert_eq!(assignment.value.as_deref(), Some(""));

        let assignment = parse_assignment("2.keep-original", false).unwrap();
        assert_eq!(assignment.target, Target::Position(2));
        assert_eq!(assignment.value, None);
    }

    #[test]
    fn test_parse_assignment_errors() {
        for raw in ["input=scan.pdf", "1.input", ".input=x", "1.=x"] {
            assert!(
                matches!(parse_assignment(raw, true), Err(Error::ArgumentFormat(..))),
                "`{raw}` should be rejected for --set"
            );
        }

        for raw in ["1.keep-original=yes", "keep-original", "1."] {
            assert!(
                matches!(parse_assignment(raw, false), Err(Error::ArgumentFormat(..))),
                "`{raw}` should be rejected for --enable"
            );
        }
    }

    #[test]
    fn test_target_parse() {
        assert_eq!(Target::parse("3"), Target::Position(3));
        assert_eq!(Target::parse("ocr_stage1"), Target::Block("ocr_stage1".to_string()));
        assert_eq!(Target::parse("-1"), Target::Block("-1".to_string()));
    }

    #[test]
    fn test_resolve_target() {
        let (workspace, chain) = linked_chain();

        assert_eq!(
            resolve_target(&Target::Position(2), &chain, &workspace).unwrap(),
            chain[1]
        );
        assert_eq!(
            resolve_target(&Target::parse("ocr_stage1"), &chain, &workspace).unwrap(),
            chain[0]
        );

        for target in [
            Target::Position(0),
            Target::Position(3),
            Target::parse("missing"),
        ] {
            assert!(matches!(
                resolve_target(&target, &chain, &workspace),
                Err(Error::UnknownTarget(_))
            ));
        }
    }

    #[test]
    fn test_apply_assignments() {
        let (mut workspace, chain) = linked_chain();
        let run = RunOptions {
            set: vec!["1.input=scan.pdf".to_string()],
            enable: vec![
                "ocr_stage1.jpeg-quality".to_string(),
                "cleanup_stage2.keep-original".to_string(),
            ],
            ..RunOptions::default()
        };

        let assignments = collect_assignments(&run).unwrap();
        assert_eq!(assignments.len(), 3);
        apply_assignments(&mut workspace, &chain, &assignments).unwrap();

        assert_eq!(
            assemble(&workspace.instances_of(&chain)),
            "python batchocr/ocr_tests.py --input scan.pdf --jpeg-quality 70 \
             python cleanocr/cleanup_tests.py --keep-original"
        );
    }

    #[test]
    fn test_apply_assignments_errors() {
        let (mut workspace, chain) = linked_chain();

        let unknown_flag = [parse_assignment("1.missing=x", true).unwrap()];
        assert!(matches!(
            apply_assignments(&mut workspace, &chain, &unknown_flag),
            Err(Error::UnknownFlag(..))
        ));

        let value_for_switch = [parse_assignment("2.keep-original=x", true).unwrap()];
        assert!(matches!(
            apply_assignments(&mut workspace, &chain, &value_for_switch),
            Err(Error::InvalidOperation(..))
        ));
    }

    #[test]
    fn test_suggest_block_id() {
        let definitions = load_definitions(BLOCKS).unwrap();

        assert_eq!(suggest_block_id("ocr", &definitions), Some("ocr_stage1"));
        assert_eq!(suggest_block_id("clean", &definitions), Some("cleanup_stage2"));
        assert_eq!(suggest_block_id("zzzz", &definitions), None);
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["cmdchain", "-c", "blocks.yml", "list"]);
        assert_eq!(args.config_path.as_deref(), Some("blocks.yml"));
        assert!(matches!(args.action, Action::List));
        assert!(args.action.run_options().is_none());

        let args = Args::parse_from([
            "cmdchain",
            "chain",
            "ocr_stage1",
            "cleanup_stage2",
            "--set",
            "1.input=scan.pdf",
            "--set",
            "1.jpeg-quality=80",
            "-f",
        ]);
        let Action::Chain { blocks, run } = &args.action else {
            panic!("expected the chain action");
        };
        assert_eq!(blocks, &["ocr_stage1", "cleanup_stage2"]);
        assert_eq!(run.set.len(), 2);
        assert!(run.force);
        assert!(!run.dry_run);

        let args = Args::parse_from(["cmdchain", "run", "pipeline.yml", "--start", "scan", "-d"]);
        let Action::Run {
            workflow, start, run
        } = &args.action
        else {
            panic!("expected the run action");
        };
        assert_eq!(workflow, "pipeline.yml");
        assert_eq!(start.as_deref(), Some("scan"));
        assert!(run.dry_run);

        // Global options may follow the subcommand
        let args = Args::parse_from(["cmdchain", "rerun", "-l", "last.yml", "-s"]);
        assert_eq!(args.last_workflow_path.as_deref(), Some("last.yml"));
        assert!(args.action.run_options().is_some_and(|run| run.skip_workflow_save));
    }

    #[test]
    fn test_chain_requires_blocks() {
        assert!(Args::try_parse_from(["cmdchain", "chain"]).is_err());
    }
}
