//! Program assembly: fragments into a buildable `main.rs` plus its `Cargo.toml`.

use std::collections::{BTreeMap, BTreeSet};

use codify_core::{AliasTable, ResourceObject};
use metrics::histogram;
use quote::quote;
use serde::Serialize;
use tracing::info;

use crate::adapter::{Fragment, FragmentNamer, KindAdapter};
use crate::resolve::AliasResolver;
use crate::CodegenError;

/// Where the generated program gets `codify-runtime` from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeSource {
    Path(String),
    /// A registry release. Only usable once the runtime is published.
    Version(String),
}

impl RuntimeSource {
    /// The runtime crate this codegen was built next to.
    pub fn workspace() -> Self {
        RuntimeSource::Path(concat!(env!("CARGO_MANIFEST_DIR"), "/../runtime").to_string())
    }
}

/// Naming and authorship of the generated program.
#[derive(Debug, Clone)]
pub struct ProgramValues {
    /// Package and application name, lowercase.
    pub app_name: String,
    pub description: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub copyright_year: Option<String>,
    pub runtime: RuntimeSource,
}

impl Default for ProgramValues {
    fn default() -> Self {
        Self {
            app_name: "app".into(),
            description: String::new(),
            author_name: None,
            author_email: None,
            copyright_year: None,
            runtime: RuntimeSource::workspace(),
        }
    }
}

impl ProgramValues {
    fn author(&self) -> Option<String> {
        let name = self.author_name.as_deref()?;
        Some(match &self.author_email {
            Some(email) => format!("{name} <{email}>"),
            None => name.to_string(),
        })
    }
}

/// A generated program.
#[derive(Debug, Clone)]
pub struct Program {
    pub main_rs: String,
    pub cargo_toml: String,
    /// `(install, uninstall)` fragment names in execution order.
    pub fragments: Vec<(String, String)>,
}

/// Cargo package rules: ASCII letters, digits, `-` and `_`, not starting with a digit.
pub fn validate_app_name(name: &str) -> Result<(), CodegenError> {
    let valid = name.len() <= 64
        && name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid { Ok(()) } else { Err(CodegenError::AppName { name: name.to_string() }) }
}

/// Generate the program for `objects`. The first object that cannot be
/// emitted aborts the whole batch.
pub fn assemble(objects: &[ResourceObject], values: &ProgramValues, table: &AliasTable) -> Result<Program, CodegenError> {
    let t0 = std::time::Instant::now();
    validate_app_name(&values.app_name)?;
    let resolver = AliasResolver::new(table);
    let mut namer = FragmentNamer::new();
    let mut installs: Vec<Fragment> = Vec::with_capacity(objects.len());
    let mut uninstalls: Vec<Fragment> = Vec::with_capacity(objects.len());
    let mut aliases = BTreeSet::new();
    let mut inventory = Vec::with_capacity(objects.len());

    for obj in objects {
        let adapter = KindAdapter::new(obj);
        let (install_name, uninstall_name) = namer.next_pair(&adapter.binding());
        let install = adapter.install(install_name, &resolver)?;
        let uninstall = adapter.uninstall(uninstall_name, &resolver)?;
        aliases.extend(install.aliases.iter().cloned());
        aliases.extend(uninstall.aliases.iter().cloned());
        inventory.push(format!("{} ({})", obj.key(), obj.kind()));
        installs.push(install);
        uninstalls.push(uninstall);
    }

    let imports = resolver.imports(&aliases);
    let install_items = installs.iter().map(|f| &f.item);
    let uninstall_items = uninstalls.iter().map(|f| &f.item);
    let install_calls = installs.iter().map(|f| &f.name);
    let uninstall_calls = uninstalls.iter().map(|f| &f.name);
    let app_name = &values.app_name;
    let description = &values.description;

    let file: syn::File = syn::parse2(quote! {
        #(#imports)*
        use codify_runtime::{Deployable, Registry};

        pub struct App {
            meta: codify_runtime::ObjectMeta,
            registry: Registry,
        }

        impl App {
            pub fn new() -> Self {
                Self {
                    meta: codify_runtime::ObjectMeta {
                        name: Some(#app_name.to_string()),
                        annotations: Some(std::collections::BTreeMap::from([(
                            "description".to_string(),
                            #description.to_string(),
                        )])),
                        ..Default::default()
                    },
                    registry: Registry::default(),
                }
            }

            #(#install_items)*

            #(#uninstall_items)*
        }

        #[codify_runtime::async_trait]
        impl Deployable for App {
            async fn install(&mut self, client: Option<&kube::Client>) -> anyhow::Result<()> {
                #(self.#install_calls(client).await?;)*
                Ok(())
            }

            async fn uninstall(&self, client: Option<&kube::Client>) -> anyhow::Result<()> {
                #(self.#uninstall_calls(client).await?;)*
                Ok(())
            }

            fn meta(&self) -> &codify_runtime::ObjectMeta {
                &self.meta
            }

            fn registry(&self) -> &Registry {
                &self.registry
            }
        }

        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            codify_runtime::run_command_line(App::new()).await
        }
    })?;

    let mut main_rs = header(values, &inventory);
    main_rs.push_str(&prettyplease::unparse(&file));
    let cargo_toml = cargo_toml(values)?;
    histogram!("codify_assemble_ms", t0.elapsed().as_secs_f64() * 1000.0);
    info!(app = %values.app_name, objects = objects.len(), bytes = main_rs.len(), "program assembled");
    Ok(Program {
        main_rs,
        cargo_toml,
        fragments: installs
            .iter()
            .zip(&uninstalls)
            .map(|(i, u)| (i.name.to_string(), u.name.to_string()))
            .collect(),
    })
}

fn header(values: &ProgramValues, inventory: &[String]) -> String {
    let mut out = String::new();
    comment(&mut out, "", &format!("Generated by codifyctl: {}.", values.app_name));
    if let Some(author) = values.author() {
        match &values.copyright_year {
            Some(year) => comment(&mut out, "", &format!("Copyright (c) {year} {author}")),
            None => comment(&mut out, "", &format!("Author: {author}")),
        }
    }
    if !values.description.is_empty() {
        out.push_str("//\n");
        comment(&mut out, "", &values.description);
    }
    if !inventory.is_empty() {
        out.push_str("//\n// Objects:\n");
        for line in inventory {
            comment(&mut out, "  ", line);
        }
    }
    out.push('\n');
    out
}

/// Append `text` as line comments, one per line, so no line escapes the header.
fn comment(out: &mut String, indent: &str, text: &str) {
    for line in text.lines() {
        let line = format!("// {indent}{}", line.replace('\r', " "));
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    package: Package<'a>,
    dependencies: BTreeMap<&'static str, Dependency>,
}

#[derive(Serialize)]
struct Package<'a> {
    name: &'a str,
    version: &'static str,
    edition: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authors: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Dependency {
    Version(&'static str),
    Detailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        features: Vec<&'static str>,
    },
}

fn detailed(version: &str, features: &[&'static str]) -> Dependency {
    Dependency::Detailed { version: Some(version.to_string()), path: None, features: features.to_vec() }
}

/// `Cargo.toml` for the generated program.
pub fn cargo_toml(values: &ProgramValues) -> Result<String, CodegenError> {
    validate_app_name(&values.app_name)?;
    let runtime = match &values.runtime {
        RuntimeSource::Path(p) => Dependency::Detailed { version: None, path: Some(p.clone()), features: vec![] },
        RuntimeSource::Version(v) => Dependency::Detailed { version: Some(v.clone()), path: None, features: vec![] },
    };
    let dependencies = BTreeMap::from([
        ("anyhow", Dependency::Version("1")),
        ("codify-runtime", runtime),
        ("k8s-openapi", detailed("0.21", &["v1_24"])),
        ("kube", detailed("0.90", &["client"])),
        ("tokio", detailed("1", &["rt-multi-thread", "macros"])),
    ]);
    let manifest = Manifest {
        package: Package {
            name: &values.app_name,
            version: "0.1.0",
            edition: "2021",
            description: Some(values.description.as_str()).filter(|d| !d.is_empty()),
            authors: values.author().into_iter().collect(),
        },
        dependencies,
    };
    Ok(toml::to_string(&manifest)?)
}
