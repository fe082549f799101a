use super::{GameLauncher, LaunchEventKind, LaunchEventSink, LaunchHandle};
use crate::error::{LauncherError, LauncherResult};
use crate::models::{LaunchConfiguration, OsFamily};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid"));

const LAUNCHER_NAME: &str = "hyperion";

/// Version JSON as written by Mojang and the Fabric installer. Only the
/// fields needed to start the client are read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionManifest {
    id: String,
    inherits_from: Option<String>,
    main_class: Option<String>,
    #[serde(default)]
    libraries: Vec<Library>,
    arguments: Option<Arguments>,
    minecraft_arguments: Option<String>,
    asset_index: Option<AssetIndexRef>,
    assets: Option<String>,
    jar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Library {
    name: String,
    downloads: Option<LibraryDownloads>,
    rules: Option<Vec<Rule>>,
}

#[derive(Debug, Clone, Deserialize)]
struct LibraryDownloads {
    artifact: Option<Artifact>,
}

#[derive(Debug, Clone, Deserialize)]
struct Artifact {
    path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AssetIndexRef {
    id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Arguments {
    #[serde(default)]
    game: Vec<Argument>,
    #[serde(default)]
    jvm: Vec<Argument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Argument {
    Plain(String),
    Conditional { rules: Vec<Rule>, value: ArgumentValue },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ArgumentValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Deserialize)]
struct Rule {
    action: RuleAction,
    os: Option<OsRule>,
    features: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct OsRule {
    name: Option<String>,
    arch: Option<String>,
}

impl Rule {
    fn applies(&self, os: OsFamily) -> bool {
        // Optional features (demo mode, custom resolution, quick play) are never enabled.
        if self.features.is_some() {
            return false;
        }
        match &self.os {
            None => true,
            Some(rule) => {
                let name_ok = rule.name.as_deref().is_none_or(|name| name == os.as_str());
                let arch_ok = rule
                    .arch
                    .as_deref()
                    .is_none_or(|arch| arch == manifest_arch(std::env::consts::ARCH));
                name_ok && arch_ok
            }
        }
    }
}

/// Architecture name as written in version manifests.
fn manifest_arch(host: &str) -> &str {
    match host {
        "aarch64" => "arm64",
        "arm" => "arm32",
        other => other,
    }
}

/// Evaluate a rule list the way the official launcher does: no rules means
/// allowed, otherwise the last applicable rule decides.
fn rules_allow(rules: Option<&[Rule]>, os: OsFamily) -> bool {
    let Some(rules) = rules else {
        return true;
    };
    if rules.is_empty() {
        return true;
    }
    rules
        .iter()
        .filter(|rule| rule.applies(os))
        .fold(false, |_, rule| rule.action == RuleAction::Allow)
}

/// Relative path of a Maven coordinate `group:artifact:version[:classifier][@ext]`.
fn maven_path(coordinate: &str) -> Option<Utf8PathBuf> {
    let (coordinate, extension) = coordinate.split_once('@').unwrap_or((coordinate, "jar"));
    let parts: Vec<&str> = coordinate.split(':').collect();
    let (group, artifact, version, classifier) = match parts.as_slice() {
        [group, artifact, version] => (*group, *artifact, *version, None),
        [group, artifact, version, classifier] => (*group, *artifact, *version, Some(*classifier)),
        _ => return None,
    };

    let file = match classifier {
        Some(classifier) => format!("{}-{}-{}.{}", artifact, version, classifier, extension),
        None => format!("{}-{}.{}", artifact, version, extension),
    };

    let mut path = Utf8PathBuf::new();
    for segment in group.split('.') {
        path.push(segment);
    }
    path.push(artifact);
    path.push(version);
    path.push(file);
    Some(path)
}

/// `group:artifact[:classifier]`, used to let the loader override vanilla libraries.
fn library_key(coordinate: &str) -> String {
    let coordinate = coordinate.split('@').next().unwrap_or(coordinate);
    let parts: Vec<&str> = coordinate.split(':').collect();
    match parts.as_slice() {
        [group, artifact, _version, classifier] => format!("{}:{}:{}", group, artifact, classifier),
        [group, artifact, ..] => format!("{}:{}", group, artifact),
        _ => coordinate.to_string(),
    }
}

/// Loader version merged over the base game version it inherits from.
#[derive(Debug, Clone)]
struct ResolvedVersion {
    id: String,
    base_id: String,
    main_class: String,
    libraries: Vec<Library>,
    jvm_args: Vec<Argument>,
    game_args: Vec<Argument>,
    legacy_game_args: Option<String>,
    asset_index: String,
    jar: String,
}

impl ResolvedVersion {
    fn merge(child: VersionManifest, parent: Option<VersionManifest>) -> LauncherResult<Self> {
        let parent = parent.unwrap_or_default();
        let base_id = if parent.id.is_empty() {
            child.id.clone()
        } else {
            parent.id.clone()
        };

        let main_class = child
            .main_class
            .or(parent.main_class)
            .ok_or_else(|| LauncherError::launch_failed(format!("{} has no main class", child.id)))?;

        let mut seen = HashSet::new();
        let libraries = child
            .libraries
            .into_iter()
            .chain(parent.libraries)
            .filter(|library| seen.insert(library_key(&library.name)))
            .collect();

        let child_args = child.arguments.unwrap_or_default();
        let parent_args = parent.arguments.unwrap_or_default();

        Ok(Self {
            main_class,
            libraries,
            jvm_args: parent_args.jvm.into_iter().chain(child_args.jvm).collect(),
            game_args: parent_args.game.into_iter().chain(child_args.game).collect(),
            legacy_game_args: child.minecraft_arguments.or(parent.minecraft_arguments),
            asset_index: child
                .asset_index
                .or(parent.asset_index)
                .map(|index| index.id)
                .or(child.assets)
                .or(parent.assets)
                .unwrap_or_else(|| base_id.clone()),
            jar: child.jar.or(parent.jar).unwrap_or_else(|| base_id.clone()),
            id: child.id,
            base_id,
        })
    }
}

fn expand(args: &[Argument], os: OsFamily) -> Vec<String> {
    let mut expanded = Vec::new();
    for arg in args {
        match arg {
            Argument::Plain(value) => expanded.push(value.clone()),
            Argument::Conditional { rules, value } => {
                if rules_allow(Some(rules), os) {
                    match value {
                        ArgumentValue::One(value) => expanded.push(value.clone()),
                        ArgumentValue::Many(values) => expanded.extend(values.iter().cloned()),
                    }
                }
            }
        }
    }
    expanded
}

fn substitute(arg: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(arg, |caps: &Captures| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Starts the game with a locally installed JVM.
///
/// Everything is read from the game directory: the loader version JSON, the
/// base version JSON and jar, and the libraries. Nothing is downloaded, so
/// the base version must already be present (for example from a previous
/// vanilla launch).
#[derive(Debug, Default, Clone)]
pub struct JavaGameLauncher;

impl JavaGameLauncher {
    pub fn new() -> Self {
        Self
    }

    async fn read_manifest(root: &Utf8Path, id: &str) -> LauncherResult<VersionManifest> {
        let path = root.join("versions").join(id).join(format!("{}.json", id));
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            LauncherError::launch_failed(format!("cannot read version {} at {}: {}", id, path, e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            LauncherError::launch_failed(format!("invalid version file {}: {}", path, e))
        })
    }

    async fn resolve(root: &Utf8Path, custom: &str) -> LauncherResult<ResolvedVersion> {
        let child = Self::read_manifest(root, custom).await?;
        let parent = match &child.inherits_from {
            Some(base) => Some(Self::read_manifest(root, base).await.map_err(|e| {
                LauncherError::launch_failed(format!(
                    "base version {} is not available ({}); start it once with the official launcher",
                    base, e
                ))
            })?),
            None => None,
        };
        ResolvedVersion::merge(child, parent)
    }

    fn classpath(root: &Utf8Path, version: &ResolvedVersion, os: OsFamily) -> LauncherResult<Vec<Utf8PathBuf>> {
        let library_dir = root.join("libraries");
        let mut entries = Vec::new();

        for library in &version.libraries {
            if !rules_allow(library.rules.as_deref(), os) {
                continue;
            }
            let relative = library
                .downloads
                .as_ref()
                .and_then(|d| d.artifact.as_ref())
                .and_then(|a| a.path.as_deref())
                .map(Utf8PathBuf::from)
                .or_else(|| maven_path(&library.name))
                .ok_or_else(|| {
                    LauncherError::launch_failed(format!("invalid library name {}", library.name))
                })?;
            let path = library_dir.join(relative);
            if !path.is_file() {
                return Err(LauncherError::launch_failed(format!(
                    "library {} is missing at {}",
                    library.name, path
                )));
            }
            entries.push(path);
        }

        let client_jar = root
            .join("versions")
            .join(&version.jar)
            .join(format!("{}.jar", version.jar));
        if !client_jar.is_file() {
            return Err(LauncherError::launch_failed(format!(
                "game jar is missing at {}",
                client_jar
            )));
        }
        entries.push(client_jar);

        Ok(entries)
    }

    /// Assemble the full JVM argument list for `config`.
    async fn build_arguments(config: &LaunchConfiguration) -> LauncherResult<Vec<String>> {
        let root = config.root.as_path();
        let version = Self::resolve(root, &config.version.custom).await?;
        if version.base_id != config.version.number {
            return Err(LauncherError::launch_failed(format!(
                "{} is built on {} but the profile expects {}",
                version.id, version.base_id, config.version.number
            )));
        }
        let classpath = Self::classpath(root, &version, config.os)?;

        let natives_dir = root.join("versions").join(&version.id).join("natives");
        tokio::fs::create_dir_all(&natives_dir)
            .await
            .map_err(|e| LauncherError::io(&natives_dir, e))?;

        let separator = if config.os == OsFamily::Windows { ";" } else { ":" };
        let classpath = classpath
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(separator);

        let values: HashMap<&str, String> = HashMap::from([
            ("auth_player_name", config.identity.name.clone()),
            ("auth_uuid", config.identity.uuid.clone()),
            ("auth_access_token", config.identity.access_token.clone()),
            ("auth_session", config.identity.access_token.clone()),
            ("auth_xuid", String::new()),
            ("clientid", String::new()),
            ("user_type", config.identity.user_type.clone()),
            ("user_properties", "{}".to_string()),
            ("version_name", version.id.clone()),
            ("version_type", config.version.kind.clone()),
            ("game_directory", root.to_string()),
            ("assets_root", root.join("assets").to_string()),
            ("game_assets", root.join("assets").to_string()),
            ("assets_index_name", version.asset_index.clone()),
            ("natives_directory", natives_dir.to_string()),
            ("library_directory", root.join("libraries").to_string()),
            ("classpath_separator", separator.to_string()),
            ("classpath", classpath),
            ("launcher_name", LAUNCHER_NAME.to_string()),
            ("launcher_version", crate::VERSION.to_string()),
        ]);

        let jvm_args = if version.jvm_args.is_empty() {
            vec![
                "-Djava.library.path=${natives_directory}".to_string(),
                "-cp".to_string(),
                "${classpath}".to_string(),
            ]
        } else {
            expand(&version.jvm_args, config.os)
        };

        let game_args = match &version.legacy_game_args {
            Some(legacy) if version.game_args.is_empty() => {
                legacy.split_whitespace().map(str::to_string).collect()
            }
            _ => expand(&version.game_args, config.os),
        };

        let mut args = vec![
            format!("-Xms{}", config.memory.min),
            format!("-Xmx{}", config.memory.max),
        ];
        args.extend(jvm_args.iter().map(|arg| substitute(arg, &values)));
        args.push(version.main_class.clone());
        args.extend(game_args.iter().map(|arg| substitute(arg, &values)));

        tracing::debug!(
            "Resolved {} on {} with {} libraries",
            version.id,
            version.base_id,
            version.libraries.len()
        );
        Ok(args)
    }
}

async fn forward_lines<R>(reader: R, events: LaunchEventSink)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => events.emit(LaunchEventKind::Data(line)),
            Ok(None) => break,
            Err(e) => {
                events.emit(LaunchEventKind::Error(format!("output stream failed: {}", e)));
                break;
            }
        }
    }
}

#[async_trait]
impl GameLauncher for JavaGameLauncher {
    async fn launch(
        &self,
        config: &LaunchConfiguration,
        events: LaunchEventSink,
    ) -> LauncherResult<LaunchHandle> {
        let args = Self::build_arguments(config).await?;
        events.debug(format!("{} {}", config.executable, args.join(" ")));

        let mut child = Command::new(&config.executable)
            .args(&args)
            .current_dir(&config.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                LauncherError::launch_failed(format!("failed to start {}: {}", config.executable, e))
            })?;

        let pid = child.id();
        let stdout = child.stdout.take().map(|out| tokio::spawn(forward_lines(out, events.clone())));
        let stderr = child.stderr.take().map(|err| tokio::spawn(forward_lines(err, events.clone())));

        let launch_id = events.launch_id();
        tokio::spawn(async move {
            let status = child.wait().await;
            for reader in [stdout, stderr].into_iter().flatten() {
                let _ = reader.await;
            }
            match status {
                Ok(status) => events.emit(LaunchEventKind::Close {
                    code: status.code(),
                }),
                Err(e) => {
                    events.emit(LaunchEventKind::Error(format!("failed to wait for game: {}", e)));
                    events.emit(LaunchEventKind::Close { code: None });
                }
            }
        });

        Ok(LaunchHandle { launch_id, pid })
    }
}
