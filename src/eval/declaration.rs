use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::eval::signal::Signal;
use crate::foundation::error::{SquinchError, SquinchResult};
use crate::geometry::target::CornerLabel;

/// Value computed by the framing evaluator.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DerivedValue {
    /// Viewpoint rotation facing the target.
    Orientation,
    /// Focal scale and optical-center shift.
    Intrinsics,
}

impl DerivedValue {
    /// All derived values, in declaration order.
    pub const ALL: [Self; 2] = [Self::Orientation, Self::Intrinsics];

    /// Inputs the computation of this value reads.
    ///
    /// The evaluator gathers snapshot data through exactly these inputs, so the declaration and
    /// the computation cannot disagree.
    pub fn reads(self) -> Vec<Input> {
        let mut out = vec![
            Input::Signal(Signal::TargetTransform),
            Input::Signal(Signal::ViewpointLocation),
        ];
        out.extend(CornerLabel::ALL.map(|c| Input::Signal(Signal::Corner(c))));
        if self == Self::Intrinsics {
            out.push(Input::Derived(Self::Orientation));
        }
        out
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Orientation => "orientation",
            Self::Intrinsics => "intrinsics",
        }
    }
}

impl fmt::Display for DerivedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node of the dependency graph: a host signal or another derived value.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    /// Host-supplied signal.
    Signal(Signal),
    /// Output of another derived value.
    Derived(DerivedValue),
}

impl From<Signal> for Input {
    fn from(s: Signal) -> Self {
        Self::Signal(s)
    }
}

impl From<DerivedValue> for Input {
    fn from(d: DerivedValue) -> Self {
        Self::Derived(d)
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(s) => s.fmt(f),
            Self::Derived(d) => d.fmt(f),
        }
    }
}

/// Builder for a [`DependencyDeclaration`].
///
/// Starts from the reads of each [`DerivedValue`] plus the time signals, with
/// [`Signal::ViewpointRotation`] driven by [`DerivedValue::Orientation`]. Hosts add path
/// parameters the viewpoint motion depends on and any extra edges they wire.
#[derive(Clone, Debug)]
pub struct DeclarationBuilder {
    inputs: BTreeMap<DerivedValue, BTreeSet<Input>>,
    drives: BTreeMap<Signal, DerivedValue>,
}

impl Default for DeclarationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationBuilder {
    /// Builder seeded with the standard framing declaration.
    pub fn new() -> Self {
        let mut inputs = BTreeMap::new();
        for d in DerivedValue::ALL {
            let mut set: BTreeSet<Input> = d.reads().into_iter().collect();
            set.insert(Input::Signal(Signal::Time));
            set.insert(Input::Signal(Signal::Subframe));
            inputs.insert(d, set);
        }
        let mut drives = BTreeMap::new();
        drives.insert(Signal::ViewpointRotation, DerivedValue::Orientation);
        Self { inputs, drives }
    }

    /// Declare that the viewpoint motion depends on path parameter `id`.
    ///
    /// Every derived value reads the viewpoint location, so each one picks up the parameter.
    pub fn path_parameter(mut self, id: u16) -> Self {
        for set in self.inputs.values_mut() {
            set.insert(Input::Signal(Signal::PathParameter(id)));
        }
        self
    }

    /// Add an extra input edge to `derived`.
    pub fn declare(mut self, derived: DerivedValue, input: impl Into<Input>) -> Self {
        self.inputs.entry(derived).or_default().insert(input.into());
        self
    }

    /// Record that the host writes `derived` back into `signal`.
    pub fn drive(mut self, signal: Signal, derived: DerivedValue) -> Self {
        self.drives.insert(signal, derived);
        self
    }

    /// Order the graph and resolve each derived value's transitive signal set.
    ///
    /// Fails with [`SquinchError::CyclicDependency`] when a derived value reaches itself, either
    /// directly or through a signal it drives.
    pub fn build(self) -> SquinchResult<DependencyDeclaration> {
        // Every input and every driven signal is a graph node.
        let mut nodes: BTreeSet<Input> = BTreeSet::new();
        for (d, set) in &self.inputs {
            nodes.insert(Input::Derived(*d));
            nodes.extend(set.iter().copied());
        }
        for (s, d) in &self.drives {
            nodes.insert(Input::Signal(*s));
            nodes.insert(Input::Derived(*d));
        }
        let nodes: Vec<Input> = nodes.into_iter().collect();
        let index: BTreeMap<Input, usize> = nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();

        // dep -> dependent edges.
        let mut outs: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut indeg = vec![0u32; nodes.len()];
        let mut edge = |dep: Input, dependent: Input| {
            let (a, b) = (index[&dep], index[&dependent]);
            outs[a].push(b);
            indeg[b] = indeg[b].saturating_add(1);
        };
        for (d, set) in &self.inputs {
            for input in set {
                edge(*input, Input::Derived(*d));
            }
        }
        for (s, d) in &self.drives {
            edge(Input::Derived(*d), Input::Signal(*s));
        }

        // Kahn topo; node indices follow `Input` ordering so ties break deterministically.
        let mut ready: BTreeSet<usize> = indeg
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| i)
            .collect();
        let mut order = Vec::new();
        let mut seen = 0usize;
        while let Some(i) = ready.pop_first() {
            seen += 1;
            if let Input::Derived(d) = nodes[i] {
                order.push(d);
            }
            for &j in &outs[i] {
                indeg[j] = indeg[j].saturating_sub(1);
                if indeg[j] == 0 {
                    ready.insert(j);
                }
            }
        }

        if seen != nodes.len() {
            let cycle = find_cycle(&nodes, &outs);
            if cycle.is_empty() {
                return Err(SquinchError::cyclic("dependency cycle detected"));
            }
            let path = cycle
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(SquinchError::cyclic(path));
        }

        // Transitive signal closure, resolved in topological order. A driven signal stands for
        // its driver's inputs.
        let mut closure: BTreeMap<DerivedValue, Vec<Signal>> = BTreeMap::new();
        for &d in &order {
            let mut set: BTreeSet<Signal> = BTreeSet::new();
            for input in self.inputs.get(&d).into_iter().flatten() {
                let upstream = match input {
                    Input::Signal(s) => self.drives.get(s).copied(),
                    Input::Derived(u) => Some(*u),
                };
                match (input, upstream) {
                    (_, Some(u)) => set.extend(closure.get(&u).into_iter().flatten().copied()),
                    (Input::Signal(s), None) => {
                        set.insert(*s);
                    }
                    (Input::Derived(_), None) => {}
                }
            }
            closure.insert(d, set.into_iter().collect());
        }

        Ok(DependencyDeclaration {
            order,
            inputs: self.inputs,
            drives: self.drives,
            closure,
        })
    }
}

fn find_cycle(nodes: &[Input], outs: &[Vec<usize>]) -> Vec<Input> {
    let n = nodes.len();
    let mut state = vec![0u8; n]; // 0=unvisited,1=visiting,2=done
    let mut stack: Vec<usize> = Vec::new();

    fn dfs(
        v: usize,
        nodes: &[Input],
        outs: &[Vec<usize>],
        state: &mut [u8],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<Input>> {
        state[v] = 1;
        stack.push(v);
        for &to in &outs[v] {
            match state[to] {
                0 => {
                    if let Some(c) = dfs(to, nodes, outs, state, stack) {
                        return Some(c);
                    }
                }
                1 => {
                    let pos = stack.iter().position(|&x| x == to).unwrap_or(0);
                    let mut cycle: Vec<Input> = stack[pos..].iter().map(|&i| nodes[i]).collect();
                    cycle.push(nodes[to]);
                    return Some(cycle);
                }
                _ => {}
            }
        }
        stack.pop();
        state[v] = 2;
        None
    }

    for i in 0..n {
        if state[i] == 0
            && let Some(c) = dfs(i, nodes, outs, &mut state, &mut stack)
        {
            return c;
        }
    }
    Vec::new()
}

/// Validated, acyclic dependency graph for the framing evaluator.
#[derive(Clone, Debug)]
pub struct DependencyDeclaration {
    order: Vec<DerivedValue>,
    inputs: BTreeMap<DerivedValue, BTreeSet<Input>>,
    drives: BTreeMap<Signal, DerivedValue>,
    closure: BTreeMap<DerivedValue, Vec<Signal>>,
}

impl DependencyDeclaration {
    /// Standard declaration with no path parameters.
    pub fn standard() -> SquinchResult<Self> {
        DeclarationBuilder::new().build()
    }

    /// Derived values, dependencies first.
    pub fn order(&self) -> &[DerivedValue] {
        &self.order
    }

    /// Direct inputs declared for `derived`.
    pub fn inputs_of(&self, derived: DerivedValue) -> impl Iterator<Item = Input> + '_ {
        self.inputs.get(&derived).into_iter().flatten().copied()
    }

    /// Every host signal `derived` transitively depends on, sorted.
    pub fn signals_for(&self, derived: DerivedValue) -> &[Signal] {
        self.closure.get(&derived).map_or(&[], Vec::as_slice)
    }

    /// Derived value that drives `signal`, if any.
    pub fn driver_of(&self, signal: Signal) -> Option<DerivedValue> {
        self.drives.get(&signal).copied()
    }

    /// Union of every signal that can invalidate some derived value.
    pub fn declared_signals(&self) -> BTreeSet<Signal> {
        self.closure.values().flatten().copied().collect()
    }

    /// Return `true` if a change to `signal` invalidates `derived`.
    pub fn depends_on(&self, derived: DerivedValue, signal: Signal) -> bool {
        self.signals_for(derived).binary_search(&signal).is_ok()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/declaration.rs"]
mod tests;
