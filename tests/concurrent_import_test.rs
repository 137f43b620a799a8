// ==========================================
// 并发导入测试
// ==========================================
// 测试目标: 验证多文件批量导入与并发导入器共享
// ==========================================


use sheet_importer::importer::*;
use sheet_importer::logging;
use sheet_importer::ImportConfig;
use std::sync::Arc;
use std::time::Instant;
use test_helpers::Person;

fn create_test_importer() -> SheetImporterImpl<Person> {
    SheetImporterImpl::for_record(ImportConfig::default()).expect("Failed to create importer")
}

#[tokio::test]
async fn test_batch_import_multiple_files() {
    // 初始化日志系统
    logging::init_test();

    // 准备多个测试文件，第 2 个含必填缺失
    let good_a = test_helpers::write_temp_csv(&test_helpers::to_csv(&test_helpers::person_rows(5)))
        .expect("Failed to write csv");
    let bad = test_helpers::write_temp_csv("Name,Age\nAlice,30\n,31\n").expect("Failed to write csv");
    let good_b = test_helpers::write_temp_csv(&test_helpers::to_csv(&test_helpers::person_rows(20)))
        .expect("Failed to write csv");

    let importer = create_test_importer();
    let file_paths = vec![good_a.path(), bad.path(), good_b.path()];

    let start = Instant::now();
    let results = importer.batch_import(file_paths).await;
    let elapsed = start.elapsed();

    // 结果与输入一一对应
    assert_eq!(results.len(), 3, "应该有3个导入结果");

    let success_count = results.iter().filter(|r| r.is_ok()).count();
    let failed_count = results.iter().filter(|r| r.is_err()).count();

    println!("批量导入完成:");
    println!("  总文件数: {}", results.len());
    println!("  成功: {}", success_count);
    println!("  失败: {}", failed_count);
    println!("  耗时: {:?}", elapsed);

    assert_eq!(success_count, 2);
    assert_eq!(failed_count, 1);

    let first = results[0].as_ref().expect("第 1 个文件应导入成功");
    assert_eq!(first.records, test_helpers::expected_people(5));

    let err = results[1].as_ref().expect_err("第 2 个文件应导入失败");
    assert_eq!(err.missing_required_column(), Some("Name"));
    assert_eq!(err.row(), Some(3));

    let third = results[2].as_ref().expect("第 3 个文件应导入成功");
    assert_eq!(third.records.len(), 20);
}

#[tokio::test]
async fn test_batch_import_missing_file() {
    logging::init_test();

    let good = test_helpers::write_temp_csv("Name,Age\nAlice,30\n").expect("Failed to write csv");
    let importer = create_test_importer();

    let results = importer
        .batch_import(vec![
            good.path().to_path_buf(),
            std::path::PathBuf::from("no/such/people.csv"),
        ])
        .await;

    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ImportError::FileNotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_importer_across_tasks() {
    logging::init_test();

    let importer = Arc::new(create_test_importer());

    // 并发导入互不干扰，每个任务拿到独立结果
    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let importer = Arc::clone(&importer);
            tokio::spawn(async move {
                importer
                    .import_sheet(test_helpers::person_sheet(n * 100))
                    .await
            })
        })
        .collect();

    for (n, handle) in (1..=4).zip(handles) {
        let report = handle.await.expect("task panicked").expect("Import failed");
        assert_eq!(report.records, test_helpers::expected_people(n * 100));
    }
}
