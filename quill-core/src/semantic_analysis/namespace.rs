//! Name resolution.
//!
//! A name is looked up along the scope chain: locals (innermost block first, latest
//! preceding declaration), formals, the enclosing class (`this`, fields, methods), the
//! module's own declarations and finally imported modules, in import order. Inside the
//! class and the module the last declaration of a name wins.

use crate::{
    language::{
        Clazz, ClazzType, Declaration, Import, ItemDeclaration, MemberDeclaration, Module, Type,
        Variable,
    },
    CompilationContext,
};
use quill_types::{constants, Ident, Named};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalBinding {
    pub name: Ident,
    pub ty: Type,
    pub is_constant: bool,
}

/// The locals visible at some point of a function body, as a stack of block frames.
///
/// Bindings are added as their declarations are reached, so a name is never visible
/// before it is declared and a declaration cannot see itself in its own initializer.
#[derive(Debug, Clone, Default)]
pub struct LocalScope {
    frames: Vec<Vec<LocalBinding>>,
}

impl LocalScope {
    pub fn new() -> Self {
        LocalScope {
            frames: vec![vec![]],
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(vec![]);
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn declare(&mut self, name: Ident, ty: Type, is_constant: bool) {
        let binding = LocalBinding {
            name,
            ty,
            is_constant,
        };
        match self.frames.last_mut() {
            Some(frame) => frame.push(binding),
            None => self.frames.push(vec![binding]),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&LocalBinding> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|binding| binding.name.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClazzScope<'a> {
    pub index: usize,
    pub clazz: &'a Clazz,
}

/// Everything visible from one point in a module.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub module: &'a Module,
    pub clazz: Option<ClazzScope<'a>>,
    pub formals: &'a [Variable],
    pub locals: Option<&'a LocalScope>,
}

impl<'a> Scope<'a> {
    /// The scope of a module level declaration.
    pub fn module_level(module: &'a Module) -> Self {
        Scope {
            module,
            clazz: None,
            formals: &[],
            locals: None,
        }
    }

    pub fn in_clazz(module: &'a Module, index: usize) -> Self {
        Scope {
            clazz: module
                .clazzes
                .get(index)
                .map(|clazz| ClazzScope { index, clazz }),
            ..Scope::module_level(module)
        }
    }
}

/// Finds the declaration `name` refers to from `scope`, or `None` if it is unresolved.
pub fn resolve(ctx: &CompilationContext, scope: &Scope, name: &str) -> Option<Declaration> {
    if let Some(binding) = scope.locals.and_then(|locals| locals.lookup(name)) {
        return Some(Declaration::Local {
            name: binding.name.clone(),
            ty: binding.ty.clone(),
            is_constant: binding.is_constant,
        });
    }
    if let Some(formal) = scope.formals.iter().find(|f| f.name.as_str() == name) {
        return Some(Declaration::Formal {
            name: formal.name.clone(),
            ty: formal.ty.clone(),
        });
    }
    if let Some(clazz) = scope.clazz {
        let found = if name == constants::THIS_KEYWORD {
            Some(Declaration::This(clazz_type(&scope.module.name, clazz.index, clazz.clazz)))
        } else {
            field(&scope.module.name, clazz.index, clazz.clazz, name)
                .or_else(|| method(&scope.module.name, clazz.index, clazz.clazz, name))
        };
        if found.is_some() {
            return found;
        }
    }
    resolve_in_module(ctx, scope.module, name)
}

/// Resolves `name` against the declarations of `module` and then its imports.
pub fn resolve_in_module(
    ctx: &CompilationContext,
    module: &Module,
    name: &str,
) -> Option<Declaration> {
    resolve_global(module, name).or_else(|| {
        search_imports(
            ctx,
            &module.name,
            &module.imports,
            &mut HashSet::new(),
            &|imported: &Module| resolve_global(imported, name),
        )
    })
}

/// Resolves `name` against the module level declarations of `module` only: classes,
/// then functions, then variables, then traits.
pub fn resolve_global(module: &Module, name: &str) -> Option<Declaration> {
    if let Some(index) = last_named(&module.clazzes, name) {
        return Some(Declaration::Clazz {
            ty: clazz_type(&module.name, index, &module.clazzes[index]),
            index,
        });
    }
    if let Some(index) = last_named(&module.functions, name) {
        let function = &module.functions[index];
        return Some(Declaration::Function(ItemDeclaration {
            module: module.name.clone(),
            index,
            name: function.name.clone(),
            ty: Type::Function(function.signature()),
            is_constant: true,
        }));
    }
    if let Some(index) = last_named(&module.variables, name) {
        let variable = &module.variables[index];
        return Some(Declaration::GlobalVariable(ItemDeclaration {
            module: module.name.clone(),
            index,
            name: variable.name.clone(),
            ty: variable.ty.clone(),
            is_constant: variable.is_constant,
        }));
    }
    last_named(&module.traits, name).map(|index| Declaration::Trait {
        module: module.name.clone(),
        index,
        name: module.traits[index].name.clone(),
    })
}

/// Applies `lookup` to each module imported by `module_name`, in import order and
/// recursing into their imports, until it finds something.
///
/// `visited` holds the modules already searched and guards against import cycles.
pub fn search_imports<F>(
    ctx: &CompilationContext,
    module_name: &Ident,
    imports: &[Import],
    visited: &mut HashSet<String>,
    lookup: &F,
) -> Option<Declaration>
where
    F: Fn(&Module) -> Option<Declaration>,
{
    visited.insert(module_name.to_string());
    for import in imports {
        if !visited.insert(import.name.to_string()) {
            continue;
        }
        let Some(imported) = ctx.registry().get(import.name.as_str()) else {
            continue;
        };
        let found = lookup(&imported).or_else(|| {
            search_imports(ctx, &imported.name, &imported.imports, visited, lookup)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Runs `f` on the class `ty` stands for, found in `current` if it was declared there and
/// in the registry otherwise.
pub fn with_clazz<R>(
    ctx: &CompilationContext,
    current: &Module,
    ty: &ClazzType,
    f: impl FnOnce(usize, &Clazz) -> R,
) -> Option<R> {
    let declared_in = |module: &Module| {
        module
            .clazzes
            .get(ty.index)
            .filter(|clazz| clazz.name == ty.name)
            .map(|clazz| f(ty.index, clazz))
    };
    if ty.module == current.name {
        return declared_in(current);
    }
    let module = ctx.registry().get(ty.module.as_str())?;
    declared_in(module.as_ref())
}

/// The last field of `clazz` named `name`.
pub fn field(module: &Ident, clazz_index: usize, clazz: &Clazz, name: &str) -> Option<Declaration> {
    last_named(&clazz.fields, name).map(|index| {
        let field = &clazz.fields[index];
        Declaration::Field(MemberDeclaration {
            clazz: clazz_type(module, clazz_index, clazz),
            clazz_index,
            index,
            name: field.name.clone(),
            ty: field.ty.clone(),
            is_constant: field.is_constant,
        })
    })
}

/// The last method of `clazz` named `name`.
pub fn method(
    module: &Ident,
    clazz_index: usize,
    clazz: &Clazz,
    name: &str,
) -> Option<Declaration> {
    last_named(&clazz.methods, name).map(|index| {
        let method = &clazz.methods[index];
        Declaration::Method(MemberDeclaration {
            clazz: clazz_type(module, clazz_index, clazz),
            clazz_index,
            index,
            name: method.name.clone(),
            ty: Type::Function(method.signature()),
            is_constant: true,
        })
    })
}

pub fn clazz_type(module: &Ident, index: usize, clazz: &Clazz) -> ClazzType {
    ClazzType {
        name: clazz.name.clone(),
        module: module.clone(),
        index,
    }
}

/// Position of the last item named `name`.
pub fn last_named<T: Named>(items: &[T], name: &str) -> Option<usize> {
    items.iter().rposition(|item| item.name().as_str() == name)
}

/// Position of the first item named `name`.
pub fn first_named<T: Named>(items: &[T], name: &str) -> Option<usize> {
    items.iter().position(|item| item.name().as_str() == name)
}
