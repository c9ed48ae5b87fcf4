//! Lowering of jelly types to the inference IR.
use std::collections::BTreeMap;

use crate::{
    error::InternalError,
    identifier::Ident,
    typ::{PrimitiveType, TypeArgF},
    typecheck::{FieldExp, TypeExp},
};

use super::{bindings::ExpBindings, Field, JellyType, JellyTypeArg, JellyTypeVisitor, JellyUnit};

pub(super) struct Lowering<'a> {
    bindings: &'a ExpBindings,
}

impl<'a> Lowering<'a> {
    pub(super) fn new(bindings: &'a ExpBindings) -> Self {
        Lowering { bindings }
    }
}

impl JellyTypeVisitor for Lowering<'_> {
    type Output = TypeExp;
    type Error = InternalError;

    fn visit_primitive(&mut self, prim: PrimitiveType) -> Result<TypeExp, InternalError> {
        Ok(TypeExp::Primitive(prim))
    }

    fn visit_number(&mut self, unit: &JellyUnit) -> Result<TypeExp, InternalError> {
        Ok(TypeExp::Number(unit.make_unit_exp(self.bindings)?))
    }

    fn visit_ident(&mut self, name: Ident) -> Result<TypeExp, InternalError> {
        Ok(match self.bindings.type_var(name)? {
            Some(typ) => typ.clone(),
            None => TypeExp::Tagged { name, args: vec![] },
        })
    }

    fn visit_apply(
        &mut self,
        name: Ident,
        args: &[JellyTypeArg],
    ) -> Result<TypeExp, InternalError> {
        let args = args
            .iter()
            .map(|arg| match arg {
                TypeArgF::Unit(unit) => Ok(TypeArgF::Unit(unit.make_unit_exp(self.bindings)?)),
                TypeArgF::Type(typ) => Ok(TypeArgF::Type(typ.apply(self)?)),
            })
            .collect::<Result<_, InternalError>>()?;

        Ok(TypeExp::Tagged { name, args })
    }

    fn visit_record(
        &mut self,
        fields: &BTreeMap<Ident, Field>,
        complete: bool,
    ) -> Result<TypeExp, InternalError> {
        let fields = fields
            .iter()
            .map(|(name, field)| {
                Ok((
                    *name,
                    FieldExp {
                        typ: field.typ.apply(self)?,
                        required: field.required,
                    },
                ))
            })
            .collect::<Result<_, InternalError>>()?;

        Ok(TypeExp::Record { fields, complete })
    }

    fn visit_array(&mut self, elem: &JellyType) -> Result<TypeExp, InternalError> {
        Ok(TypeExp::Array(Box::new(elem.apply(self)?)))
    }

    fn visit_function(
        &mut self,
        params: &[JellyType],
        result: &JellyType,
    ) -> Result<TypeExp, InternalError> {
        let params = params
            .iter()
            .map(|param| param.apply(self))
            .collect::<Result<_, _>>()?;

        Ok(TypeExp::Function {
            params,
            result: Box::new(result.apply(self)?),
        })
    }
}
