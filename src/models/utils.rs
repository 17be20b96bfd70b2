use typed_index_collections::TiSlice;

use super::expr::VarId;

/// Declares a nested family of variables over an index tuple, one call to
/// `func` per tuple, in lexicographic order.
pub trait AddVars {
    type Out;

    /// Create a variable with a closure
    fn vars_with<F: FnMut(Self) -> VarId>(&self, func: F) -> Self::Out
    where
        Self: Sized;
}

impl AddVars for usize {
    type Out = Vec<VarId>;

    fn vars_with<F: FnMut(Self) -> VarId>(&self, func: F) -> Self::Out
    where
        Self: Sized,
    {
        (0..*self).map(func).collect()
    }
}

impl AddVars for (usize, usize) {
    type Out = Vec<<usize as AddVars>::Out>;

    fn vars_with<F: FnMut(Self) -> VarId>(&self, mut func: F) -> Self::Out
    where
        Self: Sized,
    {
        let mut out = Vec::with_capacity(self.0);
        for i in 0..self.0 {
            out.push(self.1.vars_with(|j| func((i, j))));
        }

        out
    }
}

impl AddVars for (usize, usize, usize) {
    type Out = Vec<<(usize, usize) as AddVars>::Out>;

    fn vars_with<F: FnMut(Self) -> VarId>(&self, mut func: F) -> Self::Out
    where
        Self: Sized,
    {
        let mut out = Vec::with_capacity(self.0);
        for i in 0..self.0 {
            out.push((self.1, self.2).vars_with(|(j, k)| func((i, j, k))));
        }

        out
    }
}

/// Trait that converts variable handles to their values in an assignment
pub trait ConvertVars {
    type Out;
    fn convert(&self, values: &TiSlice<VarId, f64>) -> Self::Out;
}

impl<T: ConvertVars> ConvertVars for Vec<T> {
    type Out = Vec<T::Out>;

    fn convert(&self, values: &TiSlice<VarId, f64>) -> Self::Out {
        self.iter().map(|e| e.convert(values)).collect()
    }
}

impl ConvertVars for VarId {
    type Out = f64;

    fn convert(&self, values: &TiSlice<VarId, f64>) -> Self::Out {
        values[*self]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typed_index_collections::TiVec;

    #[test]
    fn declares_in_lexicographic_order() {
        let mut next = 0;
        let mut seen = Vec::new();
        let vars = (2, 3, 2).vars_with(|idx| {
            seen.push(idx);
            next += 1;
            VarId::from(next - 1)
        });

        assert_eq!(vars.len(), 2);
        assert_eq!(vars[1].len(), 3);
        assert_eq!(vars[1][2].len(), 2);
        assert_eq!(seen[0], (0, 0, 0));
        assert_eq!(seen[1], (0, 0, 1));
        assert_eq!(seen[11], (1, 2, 1));
        assert_eq!(*vars[1][2][1], 11);
    }

    #[test]
    fn empty_ranges_declare_nothing() {
        let mut calls = 0;
        let vars = (0, 5).vars_with(|_| {
            calls += 1;
            VarId::from(0)
        });
        assert!(vars.is_empty());
        let vars = (3, 0).vars_with(|_| {
            calls += 1;
            VarId::from(0)
        });
        assert_eq!(vars, vec![Vec::<VarId>::new(); 3]);
        assert_eq!(calls, 0);
    }

    #[test]
    fn converts_nested_families() {
        let values: TiVec<VarId, f64> = vec![0.0, 1.5, 3.0].into();
        let family = vec![vec![VarId::from(2), VarId::from(1)]];
        assert_eq!(family.convert(&values), vec![vec![3.0, 1.5]]);
    }
}
