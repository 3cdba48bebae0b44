//! Repository assembly over the graph layer.
//!
//! A repository is declared as [`RepositoryMetadata`]: a name, a domain type
//! and its methods. [`GraphRepositoryFactory`] picks the node or
//! relationship base for the domain type and builds an [`AnnotatedQuery`]
//! for every method carrying a query annotation. The result is a
//! [`GraphRepositoryProxy`] that dispatches calls by method name.
//!
//! ```ignore
//! let factory = GraphRepositoryFactory::from_context(&ctx);
//! let people = factory.repository::<Person>(
//!     RepositoryMetadata::for_entity::<Person>("PersonRepository").query(
//!         "find_by_name",
//!         ReturnType::entity::<Person>(),
//!         "MATCH (n:Person) WHERE n.name = '%s' RETURN n",
//!     ),
//! )?;
//!
//! let alice: Person = people
//!     .invoke("find_by_name", &args!["Alice"])
//!     .await?
//!     .into_object()?;
//! let everyone = people.crud().find_all().await?;
//! ```

mod crud;
mod factory;
mod lookup;
mod metadata;
mod node;
mod proxy;
mod relationship;
mod support;

pub use crud::{Direction, GraphRepository, Order, Page, PageRequest, Sort};
pub use factory::{GraphRepositoryFactory, RepositoryBase, TargetRepository};
pub use lookup::{AnnotatedQuery, GraphQueryLookupStrategy, GraphQueryMethod, RepositoryQuery, ResultShape};
pub use metadata::{GraphQuery, QueryMethod, RepositoryMetadata, ReturnType};
pub use node::NodeGraphRepository;
pub use proxy::GraphRepositoryProxy;
pub use relationship::RelationshipGraphRepository;
