use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::{FileOptions, ZipWriter};

use crate::utils::error::{DeployError, Result};

/// 把應用程式目錄打包成 zip 給 `az webapp deploy --type zip` 用。
/// 條目名稱是相對路徑、一律正斜線
pub fn build_zip_package(source_dir: &Path, excludes: &[String]) -> Result<Vec<u8>> {
    let mut files = Vec::new();
    collect_files(source_dir, source_dir, excludes, &mut files)?;

    if files.is_empty() {
        return Err(DeployError::PackagingError {
            message: format!("no files to package under {}", source_dir.display()),
        });
    }

    // 排序讓同一份輸入產生同一份壓縮檔
    files.sort();

    let zip_data = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for relative in &files {
            let content = fs::read(source_dir.join(relative)).map_err(DeployError::IoError)?;
            zip.start_file::<_, ()>(zip_entry_name(relative), FileOptions::default())?;
            zip.write_all(&content)?;
        }

        // 完成並取回底層 Vec<u8>
        let cursor = zip.finish()?;
        cursor.into_inner()
    };

    tracing::debug!(
        "📦 Packaged {} files ({} bytes)",
        files.len(),
        zip_data.len()
    );
    Ok(zip_data)
}

/// 打包並寫到指定路徑，回傳壓縮檔大小
pub fn write_package(source_dir: &Path, excludes: &[String], output_path: &Path) -> Result<usize> {
    let bytes = build_zip_package(source_dir, excludes)?;
    fs::write(output_path, &bytes).map_err(DeployError::IoError)?;
    Ok(bytes.len())
}

fn collect_files(
    root: &Path,
    dir: &Path,
    excludes: &[String],
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(DeployError::IoError)? {
        let entry = entry.map_err(DeployError::IoError)?;
        let name = entry.file_name().to_string_lossy().to_string();

        // 排除名單比對目錄與檔案名稱，任何深度都適用
        if excludes.iter().any(|excluded| excluded == &name) {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type().map_err(DeployError::IoError)?;
        if file_type.is_dir() {
            collect_files(root, &path, excludes, files)?;
        } else {
            let relative =
                path.strip_prefix(root)
                    .map_err(|_| DeployError::PackagingError {
                        message: format!("{} is outside the source tree", path.display()),
                    })?;
            files.push(relative.to_path_buf());
        }
    }
    Ok(())
}

fn zip_entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn default_excludes() -> Vec<String> {
        [".git", "target", "__pycache__", ".venv", "venv"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_package_includes_nested_files_and_skips_excluded() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("app/routers")).unwrap();
        fs::create_dir_all(dir.path().join("__pycache__")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("requirements.txt"), "fastapi\n").unwrap();
        fs::write(dir.path().join("app/main.py"), "app = ...\n").unwrap();
        fs::write(dir.path().join("app/routers/health.py"), "ok\n").unwrap();
        fs::write(dir.path().join("__pycache__/junk.pyc"), [0u8; 4]).unwrap();
        fs::write(dir.path().join(".git/config"), "[core]\n").unwrap();

        let bytes = build_zip_package(dir.path(), &default_excludes()).unwrap();

        let cursor = std::io::Cursor::new(bytes);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();

        assert_eq!(
            names,
            vec!["app/main.py", "app/routers/health.py", "requirements.txt"]
        );

        let mut content = String::new();
        archive
            .by_name("requirements.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "fastapi\n");
    }

    #[test]
    fn test_empty_tree_is_packaging_error() {
        let dir = tempfile::tempdir().unwrap();

        let error = build_zip_package(dir.path(), &default_excludes()).unwrap_err();
        assert!(matches!(error, DeployError::PackagingError { .. }));
    }

    #[test]
    fn test_write_package_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();
        let output = dir.path().join("deploy.zip");

        let size = write_package(dir.path(), &[], &output).unwrap();

        assert!(output.exists());
        assert_eq!(fs::metadata(&output).unwrap().len() as usize, size);
    }
}
