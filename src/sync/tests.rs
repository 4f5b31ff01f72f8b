mod normalize_tests {
    use crate::model::error::sync_errors::SyncDefinitionError;
    use crate::sync::service::normalize;
    use crate::sync::SyncDirectoriesDefinition;

    #[test]
    fn collapses_repeated_backslashes() {
        let mut definitions = vec![SyncDirectoriesDefinition::new(
            r"C:\\photos\\\2024",
            r"D:\backup\\photos",
        )];
        normalize(&mut definitions).unwrap();
        assert_eq!(Some(r"C:\photos\2024".to_string()), definitions[0].source_directory);
        assert_eq!(Some(r"D:\backup\photos".to_string()), definitions[0].destination_directory);
    }

    #[test]
    fn keeps_unc_prefix() {
        let mut definitions = vec![SyncDirectoriesDefinition::new(
            r"\\nas\\photos",
            r"\\\\nas\backup",
        )];
        normalize(&mut definitions).unwrap();
        assert_eq!(Some(r"\\nas\photos".to_string()), definitions[0].source_directory);
        assert_eq!(Some(r"\\nas\backup".to_string()), definitions[0].destination_directory);
    }

    #[test]
    fn collapses_repeated_forward_slashes() {
        let mut definitions = vec![SyncDirectoriesDefinition::new("/photos//2024", "/backup")];
        normalize(&mut definitions).unwrap();
        assert_eq!(Some("/photos/2024".to_string()), definitions[0].source_directory);
    }

    #[test]
    fn leaves_empty_paths_alone() {
        let mut definitions = vec![SyncDirectoriesDefinition::new("", "")];
        normalize(&mut definitions).unwrap();
        assert_eq!(Some(String::new()), definitions[0].source_directory);
        assert_eq!(Some(String::new()), definitions[0].destination_directory);
    }

    #[test]
    fn missing_directory_changes_nothing() {
        let mut definitions = vec![
            SyncDirectoriesDefinition::new(r"C:\\photos", r"D:\\backup"),
            SyncDirectoriesDefinition {
                source_directory: Some(r"C:\\other".to_string()),
                ..Default::default()
            },
        ];
        let original = definitions.clone();
        let res = normalize(&mut definitions);
        assert_eq!(Err(SyncDefinitionError::MissingDestinationDirectory(1)), res);
        assert_eq!(original, definitions);
    }
}

mod validate_tests {
    use crate::model::error::sync_errors::SyncDefinitionError;
    use crate::sync::service::validate;
    use crate::sync::SyncDirectoriesDefinition;

    #[test]
    fn keeps_local_and_unc_paths() {
        let mut definitions = vec![
            SyncDirectoriesDefinition::new(r"C:\photos", r"D:\backup\photos"),
            SyncDirectoriesDefinition::new(r"C:\photos", r"\\nas\photos"),
            SyncDirectoriesDefinition::new(r"\\nas\photos", r"\\nas\photos"),
            SyncDirectoriesDefinition::new(r"C:\", r"D:\backup\"),
        ];
        let expected = definitions.clone();
        validate(&mut definitions).unwrap();
        assert_eq!(expected, definitions);
    }

    #[test]
    fn drops_invalid_paths() {
        let mut definitions = vec![
            SyncDirectoriesDefinition::new(r"C:\photos", r"D:\backup"),
            SyncDirectoriesDefinition::new("", r"D:\backup"),
            SyncDirectoriesDefinition::new(r"C:\photos", "   "),
            SyncDirectoriesDefinition::new("photos", r"D:\backup"),
            SyncDirectoriesDefinition::new(r"C:\pho*tos", r"D:\backup"),
            SyncDirectoriesDefinition::new("/home/photos", r"D:\backup"),
        ];
        validate(&mut definitions).unwrap();
        assert_eq!(
            vec![SyncDirectoriesDefinition::new(r"C:\photos", r"D:\backup")],
            definitions
        );
    }

    #[test]
    fn missing_source_leaves_definitions_unmodified() {
        let mut definitions = vec![
            SyncDirectoriesDefinition::new("invalid", r"D:\backup"),
            SyncDirectoriesDefinition {
                destination_directory: Some(r"D:\backup".to_string()),
                ..Default::default()
            },
        ];
        let original = definitions.clone();
        let res = validate(&mut definitions);
        assert_eq!(Err(SyncDefinitionError::MissingSourceDirectory(1)), res);
        assert_eq!(original, definitions);
    }
}

mod plan_tests {
    use crate::sync::service::plan;
    use crate::sync::SyncDirectoriesDefinition;

    #[test]
    fn copies_files_missing_from_destination() {
        let definition = SyncDirectoriesDefinition::new(r"C:\a", r"D:\b");
        let result = plan(
            &definition,
            &["1.jpg", "2.jpg", "notes.txt"],
            &["2.jpg", "3.jpg"],
        );
        assert_eq!(vec!["1.jpg", "notes.txt"], result.to_copy);
        assert!(result.to_delete.is_empty());
    }

    #[test]
    fn deletes_only_when_asked() {
        let definition = SyncDirectoriesDefinition {
            delete_assets_not_in_source: true,
            ..SyncDirectoriesDefinition::new(r"C:\a", r"D:\b")
        };
        let result = plan(&definition, &["1.jpg", "2.jpg"], &["2.jpg", "3.jpg"]);
        assert_eq!(vec!["1.jpg"], result.to_copy);
        assert_eq!(vec!["3.jpg"], result.to_delete);
    }

    #[test]
    fn empty_source_copies_nothing() {
        let definition = SyncDirectoriesDefinition::new(r"C:\a", r"D:\b");
        let source: [&str; 0] = [];
        let result = plan(&definition, &source, &["2.jpg"]);
        assert!(result.to_copy.is_empty());
    }
}

mod sync_service_tests {
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::AtomicBool;

    use crate::model::error::sync_errors::SyncAssetsError;
    use crate::sync::service::SyncAssetsService;
    use crate::sync::SyncDirectoriesDefinition;
    use crate::test::{cleanup, create_files, test_dir};

    #[test]
    fn copies_and_deletes_recursively() {
        let dir = test_dir();
        create_files(&format!("{dir}/source"), &["a.jpg", "b.jpg"]);
        create_files(&format!("{dir}/source/2024"), &["c.jpg"]);
        create_files(&format!("{dir}/destination"), &["b.jpg", "old.jpg"]);
        let definition = SyncDirectoriesDefinition {
            include_sub_folders: true,
            delete_assets_not_in_source: true,
            ..SyncDirectoriesDefinition::new(
                &format!("{dir}/source"),
                &format!("{dir}/destination"),
            )
        };
        let results = SyncAssetsService::default().sync_definition(&definition);
        assert_eq!(2, results.len());
        assert_eq!(1, results[0].synced_images);
        assert_eq!(1, results[0].deleted_images);
        assert_eq!(1, results[1].synced_images);
        assert!(Path::new(&format!("{dir}/destination/a.jpg")).exists());
        assert!(!Path::new(&format!("{dir}/destination/old.jpg")).exists());
        assert_eq!(
            "c.jpg",
            fs::read_to_string(format!("{dir}/destination/2024/c.jpg")).unwrap()
        );
        cleanup();
    }

    #[test]
    fn does_not_recurse_unless_asked() {
        let dir = test_dir();
        create_files(&format!("{dir}/source"), &["a.jpg"]);
        create_files(&format!("{dir}/source/2024"), &["c.jpg"]);
        let definition = SyncDirectoriesDefinition::new(
            &format!("{dir}/source"),
            &format!("{dir}/destination"),
        );
        let results = SyncAssetsService::default().sync_definition(&definition);
        assert_eq!(1, results.len());
        assert!(Path::new(&format!("{dir}/destination/a.jpg")).exists());
        assert!(!Path::new(&format!("{dir}/destination/2024")).exists());
        cleanup();
    }

    #[test]
    fn destination_inside_source_is_not_synced_into_itself() {
        let dir = test_dir();
        create_files(&format!("{dir}/source"), &["a.jpg"]);
        create_files(&format!("{dir}/source/2024"), &["c.jpg"]);
        let definition = SyncDirectoriesDefinition {
            include_sub_folders: true,
            ..SyncDirectoriesDefinition::new(
                &format!("{dir}/source"),
                &format!("{dir}/source/mirror"),
            )
        };
        let results = SyncAssetsService::default().sync_definition(&definition);
        assert_eq!(2, results.len());
        assert!(Path::new(&format!("{dir}/source/mirror/a.jpg")).exists());
        assert!(Path::new(&format!("{dir}/source/mirror/2024/c.jpg")).exists());
        assert!(!Path::new(&format!("{dir}/source/mirror/mirror")).exists());
        // a second run still leaves the mirror alone
        let results = SyncAssetsService::default().sync_definition(&definition);
        assert_eq!(2, results.len());
        assert!(results.iter().all(|result| result.synced_images == 0));
        assert!(!Path::new(&format!("{dir}/source/mirror/mirror")).exists());
        cleanup();
    }

    #[test]
    fn missing_source_is_reported_in_result() {
        let dir = test_dir();
        let definition = SyncDirectoriesDefinition::new(
            &format!("{dir}/missing"),
            &format!("{dir}/destination"),
        );
        let results = SyncAssetsService::default().sync_definition(&definition);
        assert_eq!(1, results.len());
        assert_eq!(0, results[0].synced_images);
        assert!(results[0].message.starts_with("Sync failed"));
        cleanup();
    }

    #[test]
    fn sync_rejects_definition_without_destination() {
        let definitions = vec![SyncDirectoriesDefinition {
            source_directory: Some(r"C:\photos".to_string()),
            ..Default::default()
        }];
        let res = SyncAssetsService::default().sync(&definitions, &AtomicBool::new(false));
        assert!(matches!(res, Err(SyncAssetsError::InvalidDefinition(_))));
    }

    #[test]
    fn sync_skips_invalid_definitions() {
        let definitions = vec![SyncDirectoriesDefinition::new("relative", "other")];
        let res = SyncAssetsService::default()
            .sync(&definitions, &AtomicBool::new(false))
            .unwrap();
        assert!(res.is_empty());
    }
}
