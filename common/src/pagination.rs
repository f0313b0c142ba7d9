//! Abstractions for forward cursor-based pagination.

/// Page of nodes, each addressed by its cursor.
#[derive(Clone, Debug)]
pub struct Page<C, I> {
    /// [`Edge`]s in this [`Page`], in the order they were selected.
    pub edges: Vec<Edge<C, I>>,

    /// Indicator whether more nodes follow this [`Page`].
    pub has_more: bool,
}

impl<C, I> Page<C, I> {
    /// Creates a new [`Page`] from the provided [`Edge`]s.
    #[must_use]
    pub fn new(
        edges: impl IntoIterator<Item = impl Into<Edge<C, I>>>,
        has_more: bool,
    ) -> Self {
        Self {
            edges: edges.into_iter().map(Into::into).collect::<Vec<_>>(),
            has_more,
        }
    }

    /// Creates an empty [`Page`] with no nodes following it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            has_more: false,
        }
    }

    /// Returns the cursor of the last [`Edge`] in this [`Page`], if any.
    #[must_use]
    pub fn end_cursor(&self) -> Option<&C> {
        self.edges.last().map(|e| &e.cursor)
    }
}

/// An edge in a [`Page`].
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, I> {
    /// Cursor of this [`Edge`].
    pub cursor: C,

    /// Node of this [`Edge`].
    pub node: I,
}

impl<C, I> From<(C, I)> for Edge<C, I> {
    fn from((cursor, node): (C, I)) -> Self {
        Self { cursor, node }
    }
}

/// Forward pagination arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments<C> {
    /// Number of items to return.
    pub first: usize,

    /// Cursor strictly after which to return items.
    pub after: Option<C>,
}

impl<C> Arguments<C> {
    /// Creates new [`Arguments`], falling back to the `default` page size.
    ///
    /// [`None`] is returned if the page size is not a positive number.
    pub fn new<Num>(
        first: Option<Num>,
        after: Option<C>,
        default: Num,
    ) -> Option<Self>
    where
        Num: TryInto<usize>,
    {
        let first = first.unwrap_or(default).try_into().ok()?;
        (first > 0).then_some(Self { first, after })
    }

    /// Returns cursor requested by these [`Arguments`].
    #[must_use]
    pub fn cursor(&self) -> Option<&C> {
        self.after.as_ref()
    }

    /// Returns limit requested by these [`Arguments`].
    #[must_use]
    pub fn limit(&self) -> usize {
        self.first
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<C, F, O> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments<C>,

    /// Constraints the selected nodes must satisfy.
    pub filter: F,

    /// Ordering of the selected nodes, if any.
    ///
    /// [`None`] means the natural order of the storage.
    pub order: Option<O>,
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    Descending,
}

impl Order {
    /// Returns comparison operator selecting items strictly after a cursor in
    /// this [`Order`].
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Ascending => ">",
            Self::Descending => "<",
        }
    }

    #[cfg(feature = "postgres")]
    /// Returns SQL keyword representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty, $order:ty) => {
        #[doc = "Edge of a [`Page`]."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$cursor, $node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "[`Page`] selector."]
        pub type Selector =
            $crate::pagination::Selector<$cursor, $filter, $order>;
    };
}
