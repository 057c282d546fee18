//! Parameter layout for one arity: generic letters, parameter tokens, and the
//! action/validator signatures derived from them.
use crate::arity::Arity;
use crate::ast::{Expr, Type};
use crate::conventions::Conventions;
use crate::naming::{input_letter, output_letter};

/// A generated local or parameter: its declared type and how to refer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: Type,
    pub expr: Expr,
}

impl Token {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self { ty, expr: Expr::reference(name) }
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentLayout {
    /// element letters of the zipped trees (`N`, `O`, ...)
    pub zip_types: Vec<Type>,
    /// `Tree<N> zip_n`, ...
    pub zip_tokens: Vec<Token>,
    /// element letters of the reduced trees, continuing after the zip letters
    pub redux_types: Vec<Type>,
    pub redux_tokens: Vec<Token>,
    /// bare output letters (`A`, `B`, ...); result trees hold these
    pub output_params: Vec<Type>,
    /// per-component action results: the letters, or arrays of them when grafting
    pub output_types: Vec<Type>,
    pub action: Token,
    pub validator: Token,
    /// zip letters then reduce letters, in declaration order
    pub input_types: Vec<Type>,
}

impl ArgumentLayout {
    pub fn build(arity: &Arity, conv: &Conventions) -> Self {
        let tree = |elem: &Type| Type::named(conv.tree_type.as_str(), vec![elem.clone()]);

        let zip_types: Vec<Type> = (0..arity.zip).map(|i| Type::param(input_letter(i))).collect();
        let zip_tokens = zip_types
            .iter()
            .map(|t| Token::new(tree(t), format!("zip_{t}").to_lowercase()))
            .collect();

        let redux_types: Vec<Type> = (0..arity.redux)
            .map(|i| Type::param(input_letter(arity.zip + i)))
            .collect();
        let redux_tokens = redux_types
            .iter()
            .map(|t| Token::new(tree(t), format!("redux_{t}").to_lowercase()))
            .collect();

        let output_params: Vec<Type> = (0..arity.out).map(|i| Type::param(output_letter(i))).collect();
        let output_types: Vec<Type> = output_params
            .iter()
            .map(|t| if arity.graft { Type::array(t.clone()) } else { t.clone() })
            .collect();

        // action domain: zip elements, then whole reduce branches
        let domain: Vec<Type> = zip_types
            .iter()
            .cloned()
            .chain(redux_types.iter().map(|t| Type::named(conv.list_type.as_str(), vec![t.clone()])))
            .collect();

        let action = Token::new(
            Type::Callable {
                params: domain.clone(),
                ret: Some(Box::new(Type::tuple_or_single(output_types.clone()))),
            },
            "action",
        );
        let validator = Token::new(Type::Callable { params: domain, ret: None }, "validator");

        let input_types = zip_types.iter().chain(redux_types.iter()).cloned().collect();

        Self {
            zip_types,
            zip_tokens,
            redux_types,
            redux_tokens,
            output_params,
            output_types,
            action,
            validator,
            input_types,
        }
    }

    /// What the action returns for one call.
    pub fn action_result(&self) -> Type {
        Type::tuple_or_single(self.output_types.clone())
    }

    /// Zip tokens, reduce tokens, action, validator.
    pub fn arguments(&self) -> Vec<&Token> {
        self.zip_tokens
            .iter()
            .chain(self.redux_tokens.iter())
            .chain([&self.action, &self.validator])
            .collect()
    }

    /// Every tree parameter, zip first. Used for branch counts and path lookup.
    pub fn tree_tokens(&self) -> Vec<&Token> {
        self.zip_tokens.iter().chain(self.redux_tokens.iter()).collect()
    }

    /// Input letters then output letters.
    pub fn generics(&self) -> Vec<String> {
        self.input_types
            .iter()
            .chain(self.output_params.iter())
            .map(|t| t.to_string())
            .collect()
    }
}
