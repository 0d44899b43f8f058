//! Template parameter record for one generator run.

use serde::Serialize;
use std::path::PathBuf;

use crate::defaults::{FormatterKind, SCALAR_FILE_SUFFIX, SLICE_FILE_SUFFIX};
use crate::error::{Error, Result};
use crate::loader_template::RESERVED_IDENTIFIERS;
use crate::module::ModuleResolver;
use crate::naming::{last_path_segment, lower_first, slugify};
use crate::parser::GO_PREDECLARED;

/// Raw inputs of a generator run, with every default already resolved.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Type to load, as `package/path.Name`.
    pub type_ref: String,
    /// Go expression used verbatim as the key type.
    pub key_type: String,
    pub slice: bool,
    /// Directory the loader is written to.
    pub output_dir: PathBuf,
    /// Directory whose package decides whether the value type needs an import.
    pub invoking_dir: PathBuf,
    pub formatter: FormatterKind,
}

/// Fully resolved names and types bound into the loader template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderParams {
    pub loader_name: String,
    pub batch_name: String,
    pub package: String,
    pub name: String,
    pub key_type: String,
    pub value_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    pub slice: bool,
}

impl LoaderParams {
    /// File name of the generated loader, e.g. `user_loader_gen.go`.
    pub fn file_name(&self, extension: &str) -> String {
        let suffix = if self.slice {
            SLICE_FILE_SUFFIX
        } else {
            SCALAR_FILE_SUFFIX
        };
        format!("{}_{}.{}", slugify(&self.name), suffix, extension)
    }
}

/// Split `package/path.Name` into its package path and bare type name.
pub fn split_type_ref(type_ref: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = type_ref.split('.').collect();
    if parts.len() < 2 {
        return Err(Error::type_reference_invalid(
            type_ref,
            "type must be in the form package.Name",
        ));
    }

    let name = parts[parts.len() - 1];
    let package = parts[..parts.len() - 1].join(".");

    if name.is_empty() {
        return Err(Error::type_reference_invalid(
            type_ref,
            "type name after the last '.' is empty",
        ));
    }
    if package.is_empty() {
        return Err(Error::type_reference_invalid(
            type_ref,
            "package path before the type name is empty",
        ));
    }

    Ok((package, name.to_string()))
}

/// Resolve a request into the record the template is rendered from.
pub fn build(request: &GenerateRequest, resolver: &dyn ModuleResolver) -> Result<LoaderParams> {
    let (package_path, type_name) = split_type_ref(&request.type_ref)?;

    let invoking = resolver.resolve_invoking_module(&request.invoking_dir)?;
    let package = resolver.derive_output_module_name(&request.output_dir)?;

    let name = lower_first(&type_name).ok_or_else(|| {
        Error::type_reference_invalid(&request.type_ref, "type name is empty")
    })?;
    if slugify(&name).is_empty() {
        return Err(Error::type_reference_invalid(
            &request.type_ref,
            "type name has no characters usable in a file name",
        ));
    }

    let (loader_name, batch_name, wrapper) = if request.slice {
        (
            format!("{}SliceLoader", type_name),
            format!("{}SliceBatch", name),
            "[]",
        )
    } else {
        (
            format!("{}Loader", type_name),
            format!("{}Batch", name),
            "*",
        )
    };

    // Same package: refer to the type directly, no import needed
    let (value_type, import) = if invoking.path == package_path {
        (format!("{}{}", wrapper, type_name), None)
    } else {
        let alias = last_path_segment(&package_path);
        check_alias(alias, &package_path, &loader_name, &batch_name)?;
        (
            format!("{}{}.{}", wrapper, alias, type_name),
            Some(package_path.clone()),
        )
    };

    Ok(LoaderParams {
        loader_name,
        batch_name,
        package,
        name,
        key_type: request.key_type.clone(),
        value_type,
        import,
        slice: request.slice,
    })
}

/// Reject an import alias that would be shadowed by, or redeclare, a template
/// identifier, or that would shadow a predeclared one for the whole file.
fn check_alias(alias: &str, import_path: &str, loader_name: &str, batch_name: &str) -> Result<()> {
    let declared = [
        loader_name.to_string(),
        batch_name.to_string(),
        format!("{}Config", loader_name),
        format!("New{}", loader_name),
    ];

    if RESERVED_IDENTIFIERS.contains(&alias)
        || GO_PREDECLARED.contains(&alias)
        || declared.iter().any(|d| d == alias)
    {
        return Err(Error::name_collision(alias, import_path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleIdentity;
    use std::path::Path;

    struct StubResolver {
        path: &'static str,
    }

    impl ModuleResolver for StubResolver {
        fn resolve_invoking_module(&self, _dir: &Path) -> Result<ModuleIdentity> {
            Ok(ModuleIdentity {
                path: self.path.to_string(),
                name: last_path_segment(self.path).to_string(),
            })
        }
    }

    struct FailingResolver;

    impl ModuleResolver for FailingResolver {
        fn resolve_invoking_module(&self, dir: &Path) -> Result<ModuleIdentity> {
            Err(Error::module_resolution_failed(
                dir.display().to_string(),
                "unable to find package info",
            ))
        }
    }

    fn request(type_ref: &str, slice: bool) -> GenerateRequest {
        GenerateRequest {
            type_ref: type_ref.to_string(),
            key_type: "int".to_string(),
            slice,
            output_dir: PathBuf::from("/out"),
            invoking_dir: PathBuf::from("/proj"),
            formatter: FormatterKind::Builtin,
        }
    }

    #[test]
    fn same_package_scalar() {
        let resolver = StubResolver { path: "models" };
        let params = build(&request("models.User", false), &resolver).unwrap();

        assert_eq!(params.loader_name, "UserLoader");
        assert_eq!(params.batch_name, "userBatch");
        assert_eq!(params.package, "out");
        assert_eq!(params.name, "user");
        assert_eq!(params.key_type, "int");
        assert_eq!(params.value_type, "*User");
        assert_eq!(params.import, None);
        assert_eq!(params.file_name("go"), "user_loader_gen.go");
    }

    #[test]
    fn same_package_slice() {
        let resolver = StubResolver { path: "models" };
        let params = build(&request("models.User", true), &resolver).unwrap();

        assert_eq!(params.loader_name, "UserSliceLoader");
        assert_eq!(params.batch_name, "userSliceBatch");
        assert_eq!(params.value_type, "[]User");
        assert_eq!(params.import, None);
        assert_eq!(params.file_name("go"), "user_sliceloader_gen.go");
    }

    #[test]
    fn cross_package_is_qualified_by_last_segment() {
        let resolver = StubResolver {
            path: "github.com/x/proj/graph",
        };
        let params = build(
            &request("github.com/x/proj/models.User", false),
            &resolver,
        )
        .unwrap();

        assert_eq!(params.import.as_deref(), Some("github.com/x/proj/models"));
        assert_eq!(params.value_type, "*models.User");
    }

    #[test]
    fn dotted_package_paths_are_rejoined() {
        let resolver = StubResolver { path: "example.com/app" };
        let params = build(&request("gopkg.in/x/v2/model.Item", true), &resolver).unwrap();

        assert_eq!(params.import.as_deref(), Some("gopkg.in/x/v2/model"));
        assert_eq!(params.value_type, "[]model.Item");
    }

    #[test]
    fn toggling_slice_changes_only_mode_fields() {
        let resolver = StubResolver { path: "example.com/app" };
        let scalar = build(&request("example.com/app/models.User", false), &resolver).unwrap();
        let slice = build(&request("example.com/app/models.User", true), &resolver).unwrap();

        assert_ne!(scalar.loader_name, slice.loader_name);
        assert_ne!(scalar.batch_name, slice.batch_name);
        assert_eq!(scalar.value_type.trim_start_matches('*'), "models.User");
        assert_eq!(slice.value_type.trim_start_matches("[]"), "models.User");
        assert_eq!(scalar.package, slice.package);
        assert_eq!(scalar.name, slice.name);
        assert_eq!(scalar.key_type, slice.key_type);
        assert_eq!(scalar.import, slice.import);
    }

    #[test]
    fn key_type_passes_through_verbatim() {
        let resolver = StubResolver { path: "models" };
        let mut req = request("models.User", false);
        req.key_type = "map[string]struct{ A int }".to_string();

        let params = build(&req, &resolver).unwrap();

        assert_eq!(params.key_type, "map[string]struct{ A int }");
    }

    #[test]
    fn missing_package_qualifier_is_rejected() {
        let resolver = StubResolver { path: "models" };
        let err = build(&request("User", false), &resolver).unwrap_err();

        assert_eq!(err.code.as_str(), "type.invalid_reference");
        assert_eq!(err.message, "type must be in the form package.Name");
    }

    #[test]
    fn empty_type_name_is_rejected() {
        let resolver = StubResolver { path: "models" };
        let err = build(&request("models.", false), &resolver).unwrap_err();
        assert_eq!(err.code.as_str(), "type.invalid_reference");
    }

    #[test]
    fn empty_package_path_is_rejected() {
        let resolver = StubResolver { path: "models" };
        let err = build(&request(".User", false), &resolver).unwrap_err();
        assert_eq!(err.code.as_str(), "type.invalid_reference");
    }

    #[test]
    fn type_reference_is_checked_before_module_resolution() {
        let err = build(&request("User", false), &FailingResolver).unwrap_err();
        assert_eq!(err.code.as_str(), "type.invalid_reference");
    }

    #[test]
    fn resolution_failure_is_surfaced() {
        let err = build(&request("models.User", false), &FailingResolver).unwrap_err();
        assert_eq!(err.code.as_str(), "module.resolution_failed");
    }

    #[test]
    fn alias_colliding_with_template_identifier_is_rejected() {
        let resolver = StubResolver { path: "example.com/app" };
        let err = build(&request("example.com/app/time.Slot", false), &resolver).unwrap_err();

        assert_eq!(err.code.as_str(), "generate.name_collision");
        assert_eq!(err.details["alias"], "time");
    }

    #[test]
    fn alias_shadowing_a_predeclared_identifier_is_rejected() {
        let resolver = StubResolver { path: "example.com/app" };
        for alias in ["int", "nil", "bool", "true", "append", "close", "delete", "error"] {
            let type_ref = format!("example.com/app/{}.Thing", alias);
            let err = build(&request(&type_ref, false), &resolver).unwrap_err();

            assert_eq!(err.code.as_str(), "generate.name_collision", "{}", alias);
            assert_eq!(err.details["alias"], alias);
        }
    }

    #[test]
    fn alias_colliding_with_generated_type_is_rejected() {
        let resolver = StubResolver { path: "example.com/app" };
        let err = build(&request("example.com/app/userBatch.User", false), &resolver).unwrap_err();
        assert_eq!(err.code.as_str(), "generate.name_collision");
    }

    #[test]
    fn common_package_names_are_not_collisions() {
        let resolver = StubResolver { path: "example.com/app" };
        for alias in ["config", "models", "errors", "users"] {
            let type_ref = format!("example.com/app/{}.User", alias);
            let params = build(&request(&type_ref, false), &resolver).unwrap();
            assert_eq!(params.value_type, format!("*{}.User", alias));
        }
    }

    #[test]
    fn same_package_reference_skips_alias_check() {
        let resolver = StubResolver { path: "time" };
        let params = build(&request("time.Slot", false), &resolver).unwrap();
        assert_eq!(params.value_type, "*Slot");
    }

    #[test]
    fn type_name_without_safe_file_characters_is_rejected() {
        let resolver = StubResolver { path: "models" };
        let err = build(&request("models.\u{c5}", false), &resolver).unwrap_err();
        assert_eq!(err.code.as_str(), "type.invalid_reference");
    }
}
