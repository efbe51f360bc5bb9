//! Step 1: normalize the candidate's parameter surface.

use wirec_core::ast::{Binding, BindingElement, FunctionDecl, TypeExpr};

use crate::error::CodegenError;

/// Outcome of parameter normalization
#[derive(Debug, Clone)]
pub struct NormalizedParam {
    /// Name of the single binding the parameter now uses
    pub param_name: String,
    /// The original destructuring elements, when there were any; step 4
    /// prunes these
    pub original_elements: Option<Vec<BindingElement>>,
}

/// Replace a destructured first parameter with a single named binding of the
/// same declared type. A named parameter passes through untouched.
pub fn normalize_parameter(func: &mut FunctionDecl) -> Result<NormalizedParam, CodegenError> {
    let func_name = func.name.clone();
    let Some(param) = func.params.first_mut() else {
        return Err(CodegenError::transformation(
            func_name,
            "candidate has no parameters",
        ));
    };

    match &param.binding {
        Binding::Name { name } => Ok(NormalizedParam {
            param_name: name.clone(),
            original_elements: None,
        }),
        Binding::Destructure { elements } => {
            let elements = elements.clone();
            let param_name = binding_name_for(&param.ty);
            param.binding = Binding::Name {
                name: param_name.clone(),
            };
            Ok(NormalizedParam {
                param_name,
                original_elements: Some(elements),
            })
        }
    }
}

/// Derive a binding name from the declared type: `DashboardProps` becomes
/// `dashboardProps`; anonymous shapes become `props`.
fn binding_name_for(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Named { name, .. } if !name.is_empty() => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                None => "props".to_string(),
            }
        }
        _ => "props".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirec_core::ast::Param;

    fn destructured_func(ty: TypeExpr) -> FunctionDecl {
        FunctionDecl {
            name: "Dashboard".into(),
            params: vec![Param {
                binding: Binding::Destructure {
                    elements: vec![
                        BindingElement::simple("logger"),
                        BindingElement::simple("title"),
                    ],
                },
                ty,
            }],
            body: vec![],
        }
    }

    #[test]
    fn named_parameter_is_untouched() {
        let mut func = FunctionDecl {
            name: "Dashboard".into(),
            params: vec![Param {
                binding: Binding::Name {
                    name: "props".into(),
                },
                ty: TypeExpr::named("DashboardProps"),
            }],
            body: vec![],
        };
        let normalized = normalize_parameter(&mut func).unwrap();
        assert_eq!(normalized.param_name, "props");
        assert!(normalized.original_elements.is_none());
    }

    #[test]
    fn destructure_becomes_named_binding_of_same_type() {
        let mut func = destructured_func(TypeExpr::named("DashboardProps"));
        let normalized = normalize_parameter(&mut func).unwrap();
        assert_eq!(normalized.param_name, "dashboardProps");
        assert_eq!(normalized.original_elements.as_ref().unwrap().len(), 2);
        assert_eq!(
            func.params[0].binding,
            Binding::Name {
                name: "dashboardProps".into()
            }
        );
        assert_eq!(func.params[0].ty, TypeExpr::named("DashboardProps"));
    }

    #[test]
    fn anonymous_shape_binds_as_props() {
        let mut func = destructured_func(TypeExpr::Shape { properties: vec![] });
        let normalized = normalize_parameter(&mut func).unwrap();
        assert_eq!(normalized.param_name, "props");
    }

    #[test]
    fn no_parameters_is_a_transformation_error() {
        let mut func = FunctionDecl {
            name: "Footer".into(),
            params: vec![],
            body: vec![],
        };
        assert!(matches!(
            normalize_parameter(&mut func),
            Err(CodegenError::Transformation { .. })
        ));
    }
}
