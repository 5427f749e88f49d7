#![allow(dead_code)]

use jpackager::{PackagerSettings, TomlConfig};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use zip::write::{SimpleFileOptions, ZipWriter};

pub const JAVAFX_VERSION: &str = "25";
pub const ARCHIVE_PATH: &str = "/25/openjfx-25_linux-x64_bin-jmods.zip";
pub const MODULES: [&str; 3] = ["javafx.base", "javafx.graphics", "javafx.controls"];

const FAKE_JLINK: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --output) out="$2"; shift ;;
  esac
  shift
done
if [ -z "$out" ]; then
  echo "missing --output" >&2
  exit 2
fi
mkdir -p "$out/bin" "$out/lib"
echo 'JAVA_VERSION="25"' > "$out/release"
echo "linked runtime image into $out"
"#;

const FAKE_JPACKAGE: &str = r#"#!/bin/sh
dest=""
name=""
version=""
while [ $# -gt 0 ]; do
  case "$1" in
    --dest) dest="$2"; shift ;;
    --name) name="$2"; shift ;;
    --app-version) version="$2"; shift ;;
  esac
  shift
done
echo "Packaging $name $version"
echo "jpackage: using fake toolchain" >&2
if [ __EXIT__ -ne 0 ]; then
  exit __EXIT__
fi
touch "$dest/$name-$version.deb"
"#;

/// JavaFX jmods archive laid out like the vendor download.
pub fn jmods_zip() -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let root = format!("javafx-jmods-{}", JAVAFX_VERSION);

    zip.add_directory(format!("{}/", root), SimpleFileOptions::default())
        .unwrap();
    for module in MODULES {
        zip.start_file(format!("{}/{}.jmod", root, module), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"JM\x01\x00").unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// A Java home whose `jlink` and `jpackage` are shell scripts.
pub fn fake_java_home(root: &Path, jpackage_exit: i32) -> PathBuf {
    let java_home = root.join("jdk");
    let bin = java_home.join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::create_dir_all(java_home.join("jmods")).unwrap();

    write_script(&bin.join("jlink"), FAKE_JLINK);
    write_script(
        &bin.join("jpackage"),
        &FAKE_JPACKAGE.replace("__EXIT__", &jpackage_exit.to_string()),
    );
    java_home
}

fn write_script(path: &Path, content: &str) {
    {
        let mut file = fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Settings for a project rooted at `root` that downloads from `base_url`.
pub fn settings(root: &Path, base_url: &str, jpackage_exit: i32) -> PackagerSettings {
    let java_home = fake_java_home(root, jpackage_exit);
    fs::create_dir_all(root.join("app/build/libs")).unwrap();
    fs::write(root.join("app/build/libs/app.jar"), b"PK").unwrap();

    let toml = format!(
        r#"
[project]
copyright = "Copyright 2026"

[modules]
javafx_version = "{}"
classifier = "linux-x64"
download_base_url = "{}"

[installer]
platform = "linux"
"#,
        JAVAFX_VERSION, base_url
    );
    let config = TomlConfig::from_toml_str(&toml).unwrap();
    PackagerSettings::resolve(&config, root, Some(&java_home)).unwrap()
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}
