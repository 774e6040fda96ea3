use std::fmt;

/// One argument of a function type: the MeTTa type name plus the field it
/// came from, which is rendered as a trailing `; label` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: String,
    pub label: String,
}

impl Param {
    pub fn new(ty: impl Into<String>, label: impl Into<String>) -> Self {
        Param {
            ty: ty.into(),
            label: label.into(),
        }
    }
}

/// A MeTTa function type, either flat `(-> T1 .. Tn R)` or right-nested
/// `(-> T1 (-> T2 .. (-> Tn R)))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FnType {
    Atom(String),
    Arrow(Vec<Param>, Box<FnType>),
}

impl FnType {
    /// Folds the parameters into a function type returning `ret`.
    ///
    /// Uncurried mode keeps one flat argument list; curried mode wraps one
    /// parameter at a time, innermost last. With fewer than two parameters both
    /// modes give the same value.
    pub fn build<I>(params: I, ret: impl Into<String>, curried: bool) -> FnType
    where
        I: IntoIterator<Item = Param>,
        I::IntoIter: DoubleEndedIterator,
    {
        let ret = FnType::Atom(ret.into());
        let params = params.into_iter();
        if !curried {
            return FnType::Arrow(params.collect(), Box::new(ret));
        }
        match params
            .rev()
            .fold(ret, |acc, p| FnType::Arrow(vec![p], Box::new(acc)))
        {
            FnType::Atom(name) => FnType::Arrow(Vec::new(), Box::new(FnType::Atom(name))),
            arrow => arrow,
        }
    }

    /// Parameters along the right spine, in application order.
    pub fn params(&self) -> Vec<&Param> {
        let mut out = Vec::new();
        let mut cur = self;
        while let FnType::Arrow(params, ret) = cur {
            out.extend(params.iter());
            cur = ret;
        }
        out
    }

    /// The final result type once every parameter has been applied.
    pub fn result(&self) -> &str {
        let mut cur = self;
        loop {
            match cur {
                FnType::Atom(name) => return name,
                FnType::Arrow(_, ret) => cur = ret,
            }
        }
    }

    pub fn arity(&self) -> usize {
        self.params().len()
    }

    pub fn curry(&self) -> FnType {
        FnType::build(self.params().into_iter().cloned(), self.result(), true)
    }

    pub fn uncurry(&self) -> FnType {
        FnType::build(self.params().into_iter().cloned(), self.result(), false)
    }

    /// Multi-line rendering used in constructor declarations, one parameter
    /// per line with its label as a comment. `curried` selects the chained
    /// layout for single-parameter arrows.
    pub fn render_block(&self, out: &mut String, curried: bool) {
        match self {
            FnType::Atom(name) => {
                out.push_str(&format!("    {name}"));
            }
            FnType::Arrow(params, ret) if curried && params.len() == 1 => {
                out.push_str(&format!("   (-> {} ; {}\n", params[0].ty, params[0].label));
                ret.render_block(out, curried);
                out.push(')');
            }
            FnType::Arrow(params, ret) => {
                out.push_str("   (->\n");
                for p in params {
                    out.push_str(&format!("    {} ; {}\n", p.ty, p.label));
                }
                ret.render_block(out, curried);
                out.push(')');
            }
        }
    }
}

impl fmt::Display for FnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FnType::Atom(name) => f.write_str(name),
            FnType::Arrow(params, ret) => {
                f.write_str("(->")?;
                for p in params {
                    write!(f, " {}", p.ty)?;
                }
                write!(f, " {ret})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(n: usize) -> Vec<Param> {
        (1..=n)
            .map(|i| Param::new(format!("T{i}"), format!("f{i}")))
            .collect()
    }

    #[test]
    fn uncurried_is_one_flat_arrow() {
        let ty = FnType::build(fields(3), "R", false);
        assert_eq!(ty.to_string(), "(-> T1 T2 T3 R)");
        assert_eq!(ty.arity(), 3);
        assert_eq!(ty.result(), "R");
    }

    #[test]
    fn curried_nests_to_the_right() {
        let ty = FnType::build(fields(3), "R", true);
        assert_eq!(ty.to_string(), "(-> T1 (-> T2 (-> T3 R)))");
        assert_eq!(ty.arity(), 3);
        assert_eq!(ty.result(), "R");
    }

    #[test]
    fn modes_agree_below_two_parameters() {
        for n in 0..2 {
            assert_eq!(
                FnType::build(fields(n), "R", true),
                FnType::build(fields(n), "R", false),
                "n = {n}"
            );
        }
        assert_eq!(FnType::build(fields(0), "R", true).to_string(), "(-> R)");
        assert_eq!(FnType::build(fields(1), "R", true).to_string(), "(-> T1 R)");
    }

    #[test]
    fn curry_and_uncurry_convert_between_modes() {
        for n in 0..6 {
            let flat = FnType::build(fields(n), "R", false);
            let nested = FnType::build(fields(n), "R", true);
            assert_eq!(flat.curry(), nested, "n = {n}");
            assert_eq!(nested.uncurry(), flat, "n = {n}");
            assert_eq!(flat.params(), nested.params());
        }
    }

    #[test]
    fn render_block_layouts() {
        let mut flat = String::new();
        FnType::build(fields(2), "R", false).render_block(&mut flat, false);
        assert_eq!(flat, "   (->\n    T1 ; f1\n    T2 ; f2\n    R)");

        let mut nested = String::new();
        FnType::build(fields(2), "R", true).render_block(&mut nested, true);
        assert_eq!(nested, "   (-> T1 ; f1\n   (-> T2 ; f2\n    R))");

        let mut empty = String::new();
        FnType::build(fields(0), "R", true).render_block(&mut empty, true);
        assert_eq!(empty, "   (->\n    R)");
    }
}
