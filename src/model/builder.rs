//! Flattens declaration files into the semantic model.
//!
//! Nested types are lifted with qualified names, aliases are collected into
//! the scope table, annotation pragmas are parsed, and every type reference
//! is normalized (`T!` becomes `T?`). Malformed members are logged and
//! skipped; building never fails on a single bad declaration.

use crate::model::{
    qualify, AliasDef, AliasTable, Annotations, AssociatedType, Method, Parameter, Property,
    Subscript, TypeInfo,
};
use crate::syntax::{
    AliasDecl, MemberDecl, MethodDecl, ParameterDecl, PropertyDecl, SourceFile, SubscriptDecl,
    TypeDecl, TypeKind, TypeName,
};
use log::{debug, warn};

/// Builder output: raw types in declaration order (duplicates and extensions
/// still separate entries) plus the collected alias table.
#[derive(Debug, Clone, Default)]
pub struct RawModel {
    pub types: Vec<TypeInfo>,
    pub aliases: AliasTable,
}

pub fn build_model(files: &[SourceFile]) -> RawModel {
    let mut model = RawModel::default();
    for file in files {
        for alias in &file.aliases {
            collect_alias(&mut model.aliases, "", alias);
        }
        for decl in &file.types {
            build_type(decl, "", &mut model);
        }
    }
    debug!(
        "built model: {} type declarations, {} aliases",
        model.types.len(),
        model.aliases.len()
    );
    model
}

fn build_type(decl: &TypeDecl, scope: &str, model: &mut RawModel) {
    let qualified = qualify(scope, &decl.name);
    let annotations = Annotations::parse(decl.comment.as_deref());
    for (name, target) in annotations.declared_aliases() {
        model.aliases.insert(
            &qualified,
            AliasDef {
                name,
                generic_parameters: Vec::new(),
                target,
            },
        );
    }

    let mut info = TypeInfo::new(qualified.clone(), decl.kind);
    info.access = decl.access;
    info.inherited = decl.inherited.clone();
    info.generic_parameters = decl.generic_parameters.clone();
    info.generic_requirements = decl.generic_requirements.clone();
    info.annotations = annotations;
    info.is_extension = decl.kind.is_extension();

    for member in &decl.members {
        let member_annotations = Annotations::parse(member.comment());
        if member_annotations.is_skipped() {
            debug!("skipping annotated member in {}", qualified);
            continue;
        }
        match member {
            MemberDecl::Method(m) => {
                if let Some(method) = build_method(m, &qualified) {
                    info.methods.push(method);
                }
            }
            MemberDecl::Property(p) => {
                if let Some(property) = build_property(p, &qualified) {
                    info.properties.push(property);
                }
            }
            MemberDecl::Subscript(s) => {
                if let Some(subscript) = build_subscript(s, &qualified) {
                    info.subscripts.push(subscript);
                }
            }
            MemberDecl::TypeAlias(a) => {
                collect_alias(&mut model.aliases, &qualified, a);
            }
            MemberDecl::AssociatedType(a) => {
                info.associated_types.push(AssociatedType {
                    name: a.name.clone(),
                    inherited: a.inherited.clone(),
                    default_type: a.default_type.as_deref().map(parse_type),
                });
            }
        }
    }

    if decl.kind == TypeKind::Protocol {
        // Protocol members cannot carry their own access modifiers.
        for method in &mut info.methods {
            method.access = info.access;
        }
        for property in &mut info.properties {
            property.access = info.access;
        }
        for subscript in &mut info.subscripts {
            subscript.access = info.access;
        }
    }

    model.types.push(info);

    for nested in &decl.nested {
        build_type(nested, &qualified, model);
    }
}

fn build_method(decl: &MethodDecl, owner: &str) -> Option<Method> {
    let is_initializer = decl.is_initializer || decl.name == "init";
    if decl.name.is_empty() {
        warn!("skipping unnamed method in {}", owner);
        return None;
    }
    let parameters = build_parameters(&decl.parameters, owner)?;
    Some(Method {
        name: decl.name.clone(),
        parameters,
        return_type: decl
            .return_type
            .as_deref()
            .map(parse_type)
            .unwrap_or_else(TypeName::void),
        is_async: decl.is_async,
        is_throwing: decl.is_throwing,
        is_static: decl.is_static,
        is_initializer,
        is_required: decl.is_required,
        is_failable: decl.is_failable,
        access: decl.access,
        generic_parameters: decl.generic_parameters.clone(),
        generic_requirements: decl.generic_requirements.clone(),
        attributes: decl.attributes.clone(),
    })
}

fn build_property(decl: &PropertyDecl, owner: &str) -> Option<Property> {
    if decl.name.is_empty() || decl.type_name.is_empty() {
        warn!("skipping malformed property in {}", owner);
        return None;
    }
    Some(Property {
        name: decl.name.clone(),
        ty: parse_type(&decl.type_name),
        is_read_only: !decl.has_setter,
        is_async: decl.is_async,
        is_throwing: decl.is_throwing,
        is_static: decl.is_static,
        access: decl.access,
        attributes: decl.attributes.clone(),
    })
}

fn build_subscript(decl: &SubscriptDecl, owner: &str) -> Option<Subscript> {
    if decl.type_name.is_empty() || decl.parameters.is_empty() {
        warn!("skipping malformed subscript in {}", owner);
        return None;
    }
    let parameters = build_parameters(&decl.parameters, owner)?;
    Some(Subscript {
        parameters,
        ty: parse_type(&decl.type_name),
        is_read_only: !decl.has_setter,
        is_static: decl.is_static,
        access: decl.access,
        generic_parameters: decl.generic_parameters.clone(),
        generic_requirements: Vec::new(),
    })
}

fn build_parameters(decls: &[ParameterDecl], owner: &str) -> Option<Vec<Parameter>> {
    let mut parameters = Vec::with_capacity(decls.len());
    for decl in decls {
        if decl.name.is_empty() || decl.type_name.is_empty() {
            warn!("skipping member with malformed parameter in {}", owner);
            return None;
        }
        parameters.push(build_parameter(decl));
    }
    Some(parameters)
}

fn build_parameter(decl: &ParameterDecl) -> Parameter {
    let mut raw = decl.type_name.trim();
    let mut is_inout = decl.is_inout;
    if let Some(stripped) = raw.strip_prefix("inout ") {
        is_inout = true;
        raw = stripped.trim();
    }
    let mut is_variadic = decl.is_variadic;
    let raw = if let Some(stripped) = raw.strip_suffix("...") {
        is_variadic = true;
        stripped.trim()
    } else {
        raw
    };
    let label = match decl.label.as_deref() {
        None | Some("_") | Some("") => None,
        Some(other) => Some(other.to_string()),
    };
    Parameter {
        label,
        name: decl.name.clone(),
        ty: parse_type(raw),
        is_inout,
        is_variadic,
    }
}

fn collect_alias(table: &mut AliasTable, scope: &str, decl: &AliasDecl) {
    if decl.name.is_empty() || decl.target.is_empty() {
        warn!("skipping malformed typealias in scope '{}'", scope);
        return;
    }
    table.insert(
        scope,
        AliasDef {
            name: decl.name.clone(),
            generic_parameters: decl.generic_parameters.clone(),
            target: decl.target.clone(),
        },
    );
}

fn parse_type(raw: &str) -> TypeName {
    TypeName::parse(raw).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TypeKind;

    fn method(name: &str, params: Vec<ParameterDecl>, ret: Option<&str>) -> MemberDecl {
        MemberDecl::Method(MethodDecl {
            name: name.to_string(),
            parameters: params,
            return_type: ret.map(str::to_string),
            ..MethodDecl::default()
        })
    }

    fn param(label: Option<&str>, name: &str, ty: &str) -> ParameterDecl {
        ParameterDecl {
            label: label.map(str::to_string),
            name: name.to_string(),
            type_name: ty.to_string(),
            ..ParameterDecl::default()
        }
    }

    fn file(types: Vec<TypeDecl>) -> SourceFile {
        SourceFile {
            path: "Api.swift".into(),
            types,
            aliases: Vec::new(),
        }
    }

    fn protocol(name: &str, members: Vec<MemberDecl>) -> TypeDecl {
        TypeDecl {
            name: name.to_string(),
            kind: TypeKind::Protocol,
            access: Default::default(),
            inherited: Vec::new(),
            generic_parameters: Vec::new(),
            generic_requirements: Vec::new(),
            members,
            nested: Vec::new(),
            comment: None,
            attributes: Vec::new(),
        }
    }

    #[test]
    fn test_nested_types_get_qualified_names() {
        let mut outer = protocol("Outer", vec![]);
        outer.kind = TypeKind::Enum;
        outer.nested.push(protocol("Inner", vec![]));
        let model = build_model(&[file(vec![outer])]);
        let names: Vec<&str> = model.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Outer.Inner"]);
        assert_eq!(model.types[1].local_name, "Inner");
    }

    #[test]
    fn test_iuo_normalized_in_parameters_and_returns() {
        let decl = protocol(
            "Api",
            vec![method(
                "load",
                vec![param(Some("from"), "url", "URL!")],
                Some("Data!"),
            )],
        );
        let model = build_model(&[file(vec![decl])]);
        let m = &model.types[0].methods[0];
        assert_eq!(m.parameters[0].ty.name, "URL?");
        assert!(m.parameters[0].ty.is_optional);
        assert_eq!(m.return_type.name, "Data?");
    }

    #[test]
    fn test_missing_return_type_is_void() {
        let decl = protocol("Api", vec![method("ping", vec![], None)]);
        let model = build_model(&[file(vec![decl])]);
        assert!(model.types[0].methods[0].return_type.is_void());
    }

    #[test]
    fn test_inout_prefix_stripped_into_flag() {
        let decl = protocol(
            "Api",
            vec![method("mutate", vec![param(None, "value", "inout Int")], None)],
        );
        let model = build_model(&[file(vec![decl])]);
        let p = &model.types[0].methods[0].parameters[0];
        assert!(p.is_inout);
        assert_eq!(p.ty.name, "Int");
        assert_eq!(p.label, None);
    }

    #[test]
    fn test_underscore_label_becomes_none() {
        let decl = protocol(
            "Api",
            vec![method("send", vec![param(Some("_"), "payload", "Data")], None)],
        );
        let model = build_model(&[file(vec![decl])]);
        assert_eq!(model.types[0].methods[0].parameters[0].label, None);
    }

    #[test]
    fn test_skip_annotated_member_is_dropped() {
        let mut m = MethodDecl {
            name: "teardown".to_string(),
            ..MethodDecl::default()
        };
        m.comment = Some("// mocksmith: skip".to_string());
        let decl = protocol("Api", vec![MemberDecl::Method(m), method("ping", vec![], None)]);
        let model = build_model(&[file(vec![decl])]);
        let names: Vec<&str> = model.types[0].methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ping"]);
    }

    #[test]
    fn test_malformed_member_skipped_not_fatal() {
        let decl = protocol(
            "Api",
            vec![
                method("", vec![], None),
                method("ok", vec![param(None, "x", "Int")], Some("Int")),
            ],
        );
        let model = build_model(&[file(vec![decl])]);
        assert_eq!(model.types[0].methods.len(), 1);
        assert_eq!(model.types[0].methods[0].name, "ok");
    }

    #[test]
    fn test_member_alias_collected_at_type_scope() {
        let alias = MemberDecl::TypeAlias(AliasDecl {
            name: "Payload".to_string(),
            target: "Data".to_string(),
            ..AliasDecl::default()
        });
        let decl = protocol("Api", vec![alias]);
        let model = build_model(&[file(vec![decl])]);
        assert_eq!(
            model.aliases.lookup("Api", "Payload").map(|d| d.target.as_str()),
            Some("Data")
        );
        assert!(model.aliases.lookup("", "Payload").is_none());
    }

    #[test]
    fn test_file_scope_alias_collected() {
        let mut f = file(vec![]);
        f.aliases.push(AliasDecl {
            name: "Identifier".to_string(),
            target: "String".to_string(),
            ..AliasDecl::default()
        });
        let model = build_model(&[f]);
        assert_eq!(
            model.aliases.lookup("", "Identifier").map(|d| d.target.as_str()),
            Some("String")
        );
    }

    #[test]
    fn test_annotation_alias_pragma_feeds_table() {
        let mut decl = protocol("Api", vec![]);
        decl.comment = Some("// mocksmith: typealias = Payload = [String: Int]".to_string());
        let model = build_model(&[file(vec![decl])]);
        assert_eq!(
            model.aliases.lookup("Api", "Payload").map(|d| d.target.as_str()),
            Some("[String: Int]")
        );
    }

    #[test]
    fn test_protocol_members_inherit_type_access() {
        let mut decl = protocol("Api", vec![method("fetch", vec![], None)]);
        decl.access = crate::syntax::AccessLevel::Public;
        let model = build_model(&[file(vec![decl])]);
        assert_eq!(
            model.types[0].methods[0].access,
            crate::syntax::AccessLevel::Public
        );
    }

    #[test]
    fn test_init_name_marks_initializer() {
        let decl = TypeDecl {
            kind: TypeKind::Class,
            ..protocol("Session", vec![method("init", vec![param(None, "id", "String")], None)])
        };
        let model = build_model(&[file(vec![decl])]);
        assert!(model.types[0].methods[0].is_initializer);
    }
}
