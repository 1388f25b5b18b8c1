//! Command identifiers and typed payloads
//!
//! The host invokes commands by identifier with loosely shaped JSON
//! arguments. Each identifier has a parser that turns those arguments into a
//! [`Command`] before any handler runs, so handlers only ever see validated
//! payloads.

use mongolens_core::{ConnectionId, IndexKeys, Language, Namespace};
use mongolens_explorer::{NodeKind, TreeNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{ServiceError, ServiceResult};

/// Stable command identifiers bound at activation.
///
/// These IDs are the host-facing vocabulary and must not be renamed silently.
pub mod ids {
    // Connection management
    pub const CONNECT: &str = "mdb.connect";
    pub const CONNECT_WITH_URI: &str = "mdb.connectWithURI";
    pub const DISCONNECT: &str = "mdb.disconnect";
    pub const REMOVE_CONNECTION: &str = "mdb.removeConnection";
    pub const CHANGE_ACTIVE_CONNECTION: &str = "mdb.changeActiveConnection";
    pub const OPEN_OVERVIEW_PAGE: &str = "mdb.openOverviewPage";

    // Shell
    pub const OPEN_SHELL: &str = "mdb.openMongoDBShell";
    pub const OPEN_SHELL_FROM_TREE_VIEW: &str = "mdb.openMongoDBShellFromTreeView";

    // Playgrounds
    pub const CREATE_PLAYGROUND: &str = "mdb.createPlayground";
    pub const RUN_SELECTED_PLAYGROUND_BLOCKS: &str = "mdb.runSelectedPlaygroundBlocks";
    pub const RUN_ALL_PLAYGROUND_BLOCKS: &str = "mdb.runAllPlaygroundBlocks";

    // Export to language
    pub const EXPORT_TO_PYTHON: &str = "mdb.exportToPython";
    pub const EXPORT_TO_JAVA: &str = "mdb.exportToJava";
    pub const EXPORT_TO_CSHARP: &str = "mdb.exportToCsharp";
    pub const EXPORT_TO_NODE: &str = "mdb.exportToNode";
    pub const EXPORT_TO_RUBY: &str = "mdb.exportToRuby";
    pub const EXPORT_TO_GO: &str = "mdb.exportToGo";
    pub const EXPORT_TO_RUST: &str = "mdb.exportToRust";
    pub const EXPORT_TO_PHP: &str = "mdb.exportToPHP";

    // Tree: connection
    pub const ADD_CONNECTION: &str = "mdb.addConnection";
    pub const ADD_CONNECTION_WITH_URI: &str = "mdb.addConnectionWithURI";
    pub const CONNECT_TO_CONNECTION_TREE_ITEM: &str = "mdb.connectToConnectionTreeItem";
    pub const DISCONNECT_FROM_CONNECTION_TREE_ITEM: &str = "mdb.disconnectFromConnectionTreeItem";
    pub const REFRESH_CONNECTION: &str = "mdb.refreshConnection";
    pub const COPY_CONNECTION_STRING: &str = "mdb.copyConnectionString";
    pub const TREE_ITEM_REMOVE_CONNECTION: &str = "mdb.treeItemRemoveConnection";
    pub const RENAME_CONNECTION: &str = "mdb.renameConnection";
    pub const EDIT_CONNECTION: &str = "mdb.editConnection";
    pub const ADD_DATABASE: &str = "mdb.addDatabase";

    // Tree: database
    pub const REFRESH_DATABASE: &str = "mdb.refreshDatabase";
    pub const COPY_DATABASE_NAME: &str = "mdb.copyDatabaseName";
    pub const DROP_DATABASE: &str = "mdb.dropDatabase";
    pub const ADD_COLLECTION: &str = "mdb.addCollection";

    // Tree: collection
    pub const VIEW_COLLECTION_DOCUMENTS: &str = "mdb.viewCollectionDocuments";
    pub const REFRESH_DOCUMENT_LIST: &str = "mdb.refreshDocumentList";
    pub const COPY_COLLECTION_NAME: &str = "mdb.copyCollectionName";
    pub const DROP_COLLECTION: &str = "mdb.dropCollection";
    pub const REFRESH_COLLECTION: &str = "mdb.refreshCollection";
    pub const REFRESH_SCHEMA: &str = "mdb.refreshSchema";
    pub const SEARCH_FOR_DOCUMENTS: &str = "mdb.searchForDocuments";
    pub const INSERT_DOCUMENT_FROM_TREE_VIEW: &str = "mdb.insertDocumentFromTreeView";
    pub const CREATE_INDEX_FROM_TREE_VIEW: &str = "mdb.createIndexFromTreeView";

    // Tree: document
    pub const OPEN_DOCUMENT_FROM_TREE: &str = "mdb.openMongoDBDocumentFromTree";
    pub const COPY_DOCUMENT_CONTENTS_FROM_TREE_VIEW: &str = "mdb.copyDocumentContentsFromTreeView";
    pub const CLONE_DOCUMENT_FROM_TREE_VIEW: &str = "mdb.cloneDocumentFromTreeView";
    pub const DELETE_DOCUMENT_FROM_TREE_VIEW: &str = "mdb.deleteDocumentFromTreeView";

    // Documents and object ids
    pub const OPEN_DOCUMENT_FROM_CODE_LENS: &str = "mdb.openMongoDBDocumentFromCodeLens";
    pub const SAVE_DOCUMENT: &str = "mdb.saveMongoDBDocument";
    pub const INSERT_OBJECT_ID_TO_EDITOR: &str = "mdb.insertObjectIdToEditor";
    pub const GENERATE_OBJECT_ID_TO_CLIPBOARD: &str = "mdb.generateObjectIdToClipboard";
}

/// What a command accepts, for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandArgSummary {
    None,
    TreeNode,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub id: &'static str,
    pub description: &'static str,
    pub args: CommandArgSummary,
}

/// `mdb.connectWithURI` / `mdb.addConnectionWithURI`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectWithUriArgs {
    #[serde(default)]
    pub uri: Option<String>,
}

/// `mdb.removeConnection`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoveConnectionArgs {
    #[serde(default)]
    pub connection_id: Option<ConnectionId>,
}

/// `mdb.renameConnection`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameConnectionArgs {
    pub node: Option<TreeNode>,
    pub name: Option<String>,
}

/// `mdb.createIndexFromTreeView`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateIndexArgs {
    pub node: Option<TreeNode>,
    /// Without keys the index playground template is opened instead
    pub keys: Option<IndexKeys>,
}

/// `mdb.openMongoDBDocumentFromCodeLens`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CodeLensDocumentArgs {
    pub namespace: Namespace,
    pub document_id: String,
    /// Defaults to the active connection
    #[serde(default)]
    pub connection_id: Option<ConnectionId>,
}

/// Tree-item argument; `None` when invoked without a tree context
pub type TreeArg = Option<TreeNode>;

/// A validated command invocation, one variant per identifier
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Connect,
    ConnectWithUri(ConnectWithUriArgs),
    Disconnect,
    RemoveConnection(RemoveConnectionArgs),
    ChangeActiveConnection,
    OpenOverviewPage,

    OpenShell,
    OpenShellFromTreeView(TreeArg),

    CreatePlayground,
    RunSelectedPlaygroundBlocks,
    RunAllPlaygroundBlocks,
    ExportToLanguage(Language),

    AddConnection,
    AddConnectionWithUri(ConnectWithUriArgs),
    ConnectToConnectionTreeItem(TreeArg),
    DisconnectFromConnectionTreeItem(TreeArg),
    RefreshConnection(TreeArg),
    CopyConnectionString(TreeArg),
    TreeItemRemoveConnection(TreeArg),
    RenameConnection(RenameConnectionArgs),
    EditConnection(TreeArg),
    AddDatabase(TreeArg),

    RefreshDatabase(TreeArg),
    CopyDatabaseName(TreeArg),
    DropDatabase(TreeArg),
    AddCollection(TreeArg),

    ViewCollectionDocuments(TreeArg),
    RefreshDocumentList(TreeArg),
    CopyCollectionName(TreeArg),
    DropCollection(TreeArg),
    RefreshCollection(TreeArg),
    RefreshSchema(TreeArg),
    SearchForDocuments(TreeArg),
    InsertDocumentFromTreeView(TreeArg),
    CreateIndexFromTreeView(CreateIndexArgs),

    OpenDocumentFromTree(TreeArg),
    CopyDocumentContentsFromTreeView(TreeArg),
    CloneDocumentFromTreeView(TreeArg),
    DeleteDocumentFromTreeView(TreeArg),

    OpenDocumentFromCodeLens(CodeLensDocumentArgs),
    SaveDocument,
    InsertObjectIdToEditor,
    GenerateObjectIdToClipboard,
}

impl Command {
    pub fn id(&self) -> &'static str {
        match self {
            Command::Connect => ids::CONNECT,
            Command::ConnectWithUri(_) => ids::CONNECT_WITH_URI,
            Command::Disconnect => ids::DISCONNECT,
            Command::RemoveConnection(_) => ids::REMOVE_CONNECTION,
            Command::ChangeActiveConnection => ids::CHANGE_ACTIVE_CONNECTION,
            Command::OpenOverviewPage => ids::OPEN_OVERVIEW_PAGE,
            Command::OpenShell => ids::OPEN_SHELL,
            Command::OpenShellFromTreeView(_) => ids::OPEN_SHELL_FROM_TREE_VIEW,
            Command::CreatePlayground => ids::CREATE_PLAYGROUND,
            Command::RunSelectedPlaygroundBlocks => ids::RUN_SELECTED_PLAYGROUND_BLOCKS,
            Command::RunAllPlaygroundBlocks => ids::RUN_ALL_PLAYGROUND_BLOCKS,
            Command::ExportToLanguage(language) => export_id(*language),
            Command::AddConnection => ids::ADD_CONNECTION,
            Command::AddConnectionWithUri(_) => ids::ADD_CONNECTION_WITH_URI,
            Command::ConnectToConnectionTreeItem(_) => ids::CONNECT_TO_CONNECTION_TREE_ITEM,
            Command::DisconnectFromConnectionTreeItem(_) => {
                ids::DISCONNECT_FROM_CONNECTION_TREE_ITEM
            }
            Command::RefreshConnection(_) => ids::REFRESH_CONNECTION,
            Command::CopyConnectionString(_) => ids::COPY_CONNECTION_STRING,
            Command::TreeItemRemoveConnection(_) => ids::TREE_ITEM_REMOVE_CONNECTION,
            Command::RenameConnection(_) => ids::RENAME_CONNECTION,
            Command::EditConnection(_) => ids::EDIT_CONNECTION,
            Command::AddDatabase(_) => ids::ADD_DATABASE,
            Command::RefreshDatabase(_) => ids::REFRESH_DATABASE,
            Command::CopyDatabaseName(_) => ids::COPY_DATABASE_NAME,
            Command::DropDatabase(_) => ids::DROP_DATABASE,
            Command::AddCollection(_) => ids::ADD_COLLECTION,
            Command::ViewCollectionDocuments(_) => ids::VIEW_COLLECTION_DOCUMENTS,
            Command::RefreshDocumentList(_) => ids::REFRESH_DOCUMENT_LIST,
            Command::CopyCollectionName(_) => ids::COPY_COLLECTION_NAME,
            Command::DropCollection(_) => ids::DROP_COLLECTION,
            Command::RefreshCollection(_) => ids::REFRESH_COLLECTION,
            Command::RefreshSchema(_) => ids::REFRESH_SCHEMA,
            Command::SearchForDocuments(_) => ids::SEARCH_FOR_DOCUMENTS,
            Command::InsertDocumentFromTreeView(_) => ids::INSERT_DOCUMENT_FROM_TREE_VIEW,
            Command::CreateIndexFromTreeView(_) => ids::CREATE_INDEX_FROM_TREE_VIEW,
            Command::OpenDocumentFromTree(_) => ids::OPEN_DOCUMENT_FROM_TREE,
            Command::CopyDocumentContentsFromTreeView(_) => {
                ids::COPY_DOCUMENT_CONTENTS_FROM_TREE_VIEW
            }
            Command::CloneDocumentFromTreeView(_) => ids::CLONE_DOCUMENT_FROM_TREE_VIEW,
            Command::DeleteDocumentFromTreeView(_) => ids::DELETE_DOCUMENT_FROM_TREE_VIEW,
            Command::OpenDocumentFromCodeLens(_) => ids::OPEN_DOCUMENT_FROM_CODE_LENS,
            Command::SaveDocument => ids::SAVE_DOCUMENT,
            Command::InsertObjectIdToEditor => ids::INSERT_OBJECT_ID_TO_EDITOR,
            Command::GenerateObjectIdToClipboard => ids::GENERATE_OBJECT_ID_TO_CLIPBOARD,
        }
    }
}

fn export_id(language: Language) -> &'static str {
    match language {
        Language::Python => ids::EXPORT_TO_PYTHON,
        Language::Java => ids::EXPORT_TO_JAVA,
        Language::Csharp => ids::EXPORT_TO_CSHARP,
        Language::Node => ids::EXPORT_TO_NODE,
        Language::Ruby => ids::EXPORT_TO_RUBY,
        Language::Go => ids::EXPORT_TO_GO,
        Language::Rust => ids::EXPORT_TO_RUST,
        Language::Php => ids::EXPORT_TO_PHP,
    }
}

/// A raw invocation as the host delivers it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UntypedCommandInvocation {
    #[serde(alias = "command")]
    pub command_id: String,
    #[serde(default)]
    pub args: Option<Value>,
}

type Parser = fn(Option<&Value>) -> ServiceResult<Command>;

#[derive(Clone, Debug)]
pub struct CommandDefinition {
    metadata: CommandMetadata,
    parse: Parser,
}

impl CommandDefinition {
    fn new(
        id: &'static str,
        description: &'static str,
        args: CommandArgSummary,
        parse: Parser,
    ) -> Self {
        Self {
            metadata: CommandMetadata {
                id,
                description,
                args,
            },
            parse,
        }
    }

    pub fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    pub fn parse(&self, args: Option<&Value>) -> ServiceResult<Command> {
        (self.parse)(args)
    }
}

/// Every known command with its payload parser
#[derive(Debug)]
pub struct CommandRegistry {
    definitions: BTreeMap<&'static str, CommandDefinition>,
}

impl CommandRegistry {
    pub fn new() -> ServiceResult<Self> {
        Self::from_definitions(canonical_definitions())
    }

    pub fn from_definitions(definitions: Vec<CommandDefinition>) -> ServiceResult<Self> {
        let mut mapped = BTreeMap::new();
        for definition in definitions {
            let id = definition.metadata.id;
            if mapped.insert(id, definition).is_some() {
                return Err(ServiceError::DuplicateCommand {
                    command_id: id.to_owned(),
                });
            }
        }

        Ok(Self {
            definitions: mapped,
        })
    }

    pub fn lookup(&self, command_id: &str) -> ServiceResult<&CommandDefinition> {
        self.definitions
            .get(command_id)
            .ok_or_else(|| ServiceError::UnknownCommand {
                command_id: command_id.to_owned(),
            })
    }

    pub fn list(&self) -> Vec<&CommandMetadata> {
        self.definitions
            .values()
            .map(CommandDefinition::metadata)
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn parse(&self, command_id: &str, args: Option<&Value>) -> ServiceResult<Command> {
        self.lookup(command_id)?.parse(args)
    }

    pub fn parse_invocation(&self, invocation: &UntypedCommandInvocation) -> ServiceResult<Command> {
        self.parse(&invocation.command_id, invocation.args.as_ref())
    }
}

const COLLECTION_NODES: &[NodeKind] = &[NodeKind::Collection];
const COLLECTION_OR_DOCUMENTS: &[NodeKind] = &[NodeKind::Collection, NodeKind::DocumentList];

fn canonical_definitions() -> Vec<CommandDefinition> {
    use CommandArgSummary::{None as NoArgs, Object, TreeNode as Node};

    vec![
        CommandDefinition::new(ids::CONNECT, "Open the connection form.", NoArgs, |args| {
            parse_zero_arg(ids::CONNECT, args, Command::Connect)
        }),
        CommandDefinition::new(
            ids::CONNECT_WITH_URI,
            "Save and connect to a connection string.",
            Object,
            |args| parse_uri_args(ids::CONNECT_WITH_URI, args).map(Command::ConnectWithUri),
        ),
        CommandDefinition::new(
            ids::DISCONNECT,
            "Disconnect the active connection.",
            NoArgs,
            |args| parse_zero_arg(ids::DISCONNECT, args, Command::Disconnect),
        ),
        CommandDefinition::new(
            ids::REMOVE_CONNECTION,
            "Remove a saved connection.",
            Object,
            |args| {
                parse_object::<RemoveConnectionArgs>(
                    ids::REMOVE_CONNECTION,
                    args,
                    "{ connectionId?: string }",
                )
                .map(Command::RemoveConnection)
            },
        ),
        CommandDefinition::new(
            ids::CHANGE_ACTIVE_CONNECTION,
            "Pick the active connection.",
            NoArgs,
            |args| parse_zero_arg(ids::CHANGE_ACTIVE_CONNECTION, args, Command::ChangeActiveConnection),
        ),
        CommandDefinition::new(
            ids::OPEN_OVERVIEW_PAGE,
            "Open the overview page.",
            NoArgs,
            |args| parse_zero_arg(ids::OPEN_OVERVIEW_PAGE, args, Command::OpenOverviewPage),
        ),
        CommandDefinition::new(
            ids::OPEN_SHELL,
            "Launch a shell for the active connection.",
            NoArgs,
            |args| parse_zero_arg(ids::OPEN_SHELL, args, Command::OpenShell),
        ),
        CommandDefinition::new(
            ids::OPEN_SHELL_FROM_TREE_VIEW,
            "Launch a shell for a connection in the tree.",
            Node,
            |args| {
                parse_tree(
                    ids::OPEN_SHELL_FROM_TREE_VIEW,
                    args,
                    &[NodeKind::Connection],
                    Command::OpenShellFromTreeView,
                )
            },
        ),
        CommandDefinition::new(
            ids::CREATE_PLAYGROUND,
            "Create a playground.",
            NoArgs,
            |args| parse_zero_arg(ids::CREATE_PLAYGROUND, args, Command::CreatePlayground),
        ),
        CommandDefinition::new(
            ids::RUN_SELECTED_PLAYGROUND_BLOCKS,
            "Run the selected playground blocks.",
            NoArgs,
            |args| {
                parse_zero_arg(
                    ids::RUN_SELECTED_PLAYGROUND_BLOCKS,
                    args,
                    Command::RunSelectedPlaygroundBlocks,
                )
            },
        ),
        CommandDefinition::new(
            ids::RUN_ALL_PLAYGROUND_BLOCKS,
            "Run every playground block.",
            NoArgs,
            |args| {
                parse_zero_arg(
                    ids::RUN_ALL_PLAYGROUND_BLOCKS,
                    args,
                    Command::RunAllPlaygroundBlocks,
                )
            },
        ),
        export_definition(ids::EXPORT_TO_PYTHON, "Export the selection to Python.", |args| {
            parse_export(ids::EXPORT_TO_PYTHON, args, Language::Python)
        }),
        export_definition(ids::EXPORT_TO_JAVA, "Export the selection to Java.", |args| {
            parse_export(ids::EXPORT_TO_JAVA, args, Language::Java)
        }),
        export_definition(ids::EXPORT_TO_CSHARP, "Export the selection to C#.", |args| {
            parse_export(ids::EXPORT_TO_CSHARP, args, Language::Csharp)
        }),
        export_definition(ids::EXPORT_TO_NODE, "Export the selection to Node.js.", |args| {
            parse_export(ids::EXPORT_TO_NODE, args, Language::Node)
        }),
        export_definition(ids::EXPORT_TO_RUBY, "Export the selection to Ruby.", |args| {
            parse_export(ids::EXPORT_TO_RUBY, args, Language::Ruby)
        }),
        export_definition(ids::EXPORT_TO_GO, "Export the selection to Go.", |args| {
            parse_export(ids::EXPORT_TO_GO, args, Language::Go)
        }),
        export_definition(ids::EXPORT_TO_RUST, "Export the selection to Rust.", |args| {
            parse_export(ids::EXPORT_TO_RUST, args, Language::Rust)
        }),
        export_definition(ids::EXPORT_TO_PHP, "Export the selection to PHP.", |args| {
            parse_export(ids::EXPORT_TO_PHP, args, Language::Php)
        }),
        CommandDefinition::new(
            ids::ADD_CONNECTION,
            "Open the connection form to add a connection.",
            NoArgs,
            |args| parse_zero_arg(ids::ADD_CONNECTION, args, Command::AddConnection),
        ),
        CommandDefinition::new(
            ids::ADD_CONNECTION_WITH_URI,
            "Add a connection from a connection string.",
            Object,
            |args| {
                parse_uri_args(ids::ADD_CONNECTION_WITH_URI, args).map(Command::AddConnectionWithUri)
            },
        ),
        connection_node_definition(
            ids::CONNECT_TO_CONNECTION_TREE_ITEM,
            "Connect to a connection in the tree.",
            |args| {
                parse_tree(
                    ids::CONNECT_TO_CONNECTION_TREE_ITEM,
                    args,
                    &[NodeKind::Connection],
                    Command::ConnectToConnectionTreeItem,
                )
            },
        ),
        connection_node_definition(
            ids::DISCONNECT_FROM_CONNECTION_TREE_ITEM,
            "Disconnect a connection in the tree.",
            |args| {
                parse_tree(
                    ids::DISCONNECT_FROM_CONNECTION_TREE_ITEM,
                    args,
                    &[NodeKind::Connection],
                    Command::DisconnectFromConnectionTreeItem,
                )
            },
        ),
        connection_node_definition(ids::REFRESH_CONNECTION, "Refresh a connection.", |args| {
            parse_tree(
                ids::REFRESH_CONNECTION,
                args,
                &[NodeKind::Connection],
                Command::RefreshConnection,
            )
        }),
        connection_node_definition(
            ids::COPY_CONNECTION_STRING,
            "Copy a connection string.",
            |args| {
                parse_tree(
                    ids::COPY_CONNECTION_STRING,
                    args,
                    &[NodeKind::Connection],
                    Command::CopyConnectionString,
                )
            },
        ),
        connection_node_definition(
            ids::TREE_ITEM_REMOVE_CONNECTION,
            "Remove a connection in the tree.",
            |args| {
                parse_tree(
                    ids::TREE_ITEM_REMOVE_CONNECTION,
                    args,
                    &[NodeKind::Connection],
                    Command::TreeItemRemoveConnection,
                )
            },
        ),
        CommandDefinition::new(
            ids::RENAME_CONNECTION,
            "Rename a saved connection.",
            Node,
            |args| parse_rename(args).map(Command::RenameConnection),
        ),
        connection_node_definition(ids::EDIT_CONNECTION, "Edit a saved connection.", |args| {
            parse_tree(
                ids::EDIT_CONNECTION,
                args,
                &[NodeKind::Connection],
                Command::EditConnection,
            )
        }),
        connection_node_definition(ids::ADD_DATABASE, "Create a database.", |args| {
            parse_tree(
                ids::ADD_DATABASE,
                args,
                &[NodeKind::Connection],
                Command::AddDatabase,
            )
        }),
        CommandDefinition::new(ids::REFRESH_DATABASE, "Refresh a database.", Node, |args| {
            parse_tree(
                ids::REFRESH_DATABASE,
                args,
                &[NodeKind::Database],
                Command::RefreshDatabase,
            )
        }),
        CommandDefinition::new(
            ids::COPY_DATABASE_NAME,
            "Copy a database name.",
            Node,
            |args| {
                parse_tree(
                    ids::COPY_DATABASE_NAME,
                    args,
                    &[NodeKind::Database],
                    Command::CopyDatabaseName,
                )
            },
        ),
        CommandDefinition::new(ids::DROP_DATABASE, "Drop a database.", Node, |args| {
            parse_tree(
                ids::DROP_DATABASE,
                args,
                &[NodeKind::Database],
                Command::DropDatabase,
            )
        }),
        CommandDefinition::new(ids::ADD_COLLECTION, "Create a collection.", Node, |args| {
            parse_tree(
                ids::ADD_COLLECTION,
                args,
                &[NodeKind::Database],
                Command::AddCollection,
            )
        }),
        CommandDefinition::new(
            ids::VIEW_COLLECTION_DOCUMENTS,
            "Open a collection's documents.",
            Node,
            |args| {
                parse_tree(
                    ids::VIEW_COLLECTION_DOCUMENTS,
                    args,
                    COLLECTION_OR_DOCUMENTS,
                    Command::ViewCollectionDocuments,
                )
            },
        ),
        CommandDefinition::new(
            ids::REFRESH_DOCUMENT_LIST,
            "Refresh a document list.",
            Node,
            |args| {
                parse_tree(
                    ids::REFRESH_DOCUMENT_LIST,
                    args,
                    &[NodeKind::DocumentList],
                    Command::RefreshDocumentList,
                )
            },
        ),
        CommandDefinition::new(
            ids::COPY_COLLECTION_NAME,
            "Copy a collection name.",
            Node,
            |args| {
                parse_tree(
                    ids::COPY_COLLECTION_NAME,
                    args,
                    COLLECTION_NODES,
                    Command::CopyCollectionName,
                )
            },
        ),
        CommandDefinition::new(ids::DROP_COLLECTION, "Drop a collection.", Node, |args| {
            parse_tree(
                ids::DROP_COLLECTION,
                args,
                COLLECTION_NODES,
                Command::DropCollection,
            )
        }),
        CommandDefinition::new(
            ids::REFRESH_COLLECTION,
            "Refresh a collection.",
            Node,
            |args| {
                parse_tree(
                    ids::REFRESH_COLLECTION,
                    args,
                    COLLECTION_NODES,
                    Command::RefreshCollection,
                )
            },
        ),
        CommandDefinition::new(ids::REFRESH_SCHEMA, "Refresh a schema.", Node, |args| {
            parse_tree(
                ids::REFRESH_SCHEMA,
                args,
                &[NodeKind::Schema],
                Command::RefreshSchema,
            )
        }),
        CommandDefinition::new(
            ids::SEARCH_FOR_DOCUMENTS,
            "Open a search playground for a collection.",
            Node,
            |args| {
                parse_tree(
                    ids::SEARCH_FOR_DOCUMENTS,
                    args,
                    COLLECTION_OR_DOCUMENTS,
                    Command::SearchForDocuments,
                )
            },
        ),
        CommandDefinition::new(
            ids::INSERT_DOCUMENT_FROM_TREE_VIEW,
            "Open an insert playground for a collection.",
            Node,
            |args| {
                parse_tree(
                    ids::INSERT_DOCUMENT_FROM_TREE_VIEW,
                    args,
                    COLLECTION_OR_DOCUMENTS,
                    Command::InsertDocumentFromTreeView,
                )
            },
        ),
        CommandDefinition::new(
            ids::CREATE_INDEX_FROM_TREE_VIEW,
            "Create an index on a collection.",
            Node,
            |args| parse_create_index(args).map(Command::CreateIndexFromTreeView),
        ),
        document_node_definition(
            ids::OPEN_DOCUMENT_FROM_TREE,
            "Open a document in an editor.",
            |args| {
                parse_tree(
                    ids::OPEN_DOCUMENT_FROM_TREE,
                    args,
                    &[NodeKind::Document],
                    Command::OpenDocumentFromTree,
                )
            },
        ),
        document_node_definition(
            ids::COPY_DOCUMENT_CONTENTS_FROM_TREE_VIEW,
            "Copy a document as Extended JSON.",
            |args| {
                parse_tree(
                    ids::COPY_DOCUMENT_CONTENTS_FROM_TREE_VIEW,
                    args,
                    &[NodeKind::Document],
                    Command::CopyDocumentContentsFromTreeView,
                )
            },
        ),
        document_node_definition(
            ids::CLONE_DOCUMENT_FROM_TREE_VIEW,
            "Open an insert playground pre-filled with a document.",
            |args| {
                parse_tree(
                    ids::CLONE_DOCUMENT_FROM_TREE_VIEW,
                    args,
                    &[NodeKind::Document],
                    Command::CloneDocumentFromTreeView,
                )
            },
        ),
        document_node_definition(
            ids::DELETE_DOCUMENT_FROM_TREE_VIEW,
            "Delete a document.",
            |args| {
                parse_tree(
                    ids::DELETE_DOCUMENT_FROM_TREE_VIEW,
                    args,
                    &[NodeKind::Document],
                    Command::DeleteDocumentFromTreeView,
                )
            },
        ),
        CommandDefinition::new(
            ids::OPEN_DOCUMENT_FROM_CODE_LENS,
            "Open a document referenced by a code lens.",
            Object,
            parse_code_lens,
        ),
        CommandDefinition::new(
            ids::SAVE_DOCUMENT,
            "Save the document in the active editor.",
            NoArgs,
            |args| parse_zero_arg(ids::SAVE_DOCUMENT, args, Command::SaveDocument),
        ),
        CommandDefinition::new(
            ids::INSERT_OBJECT_ID_TO_EDITOR,
            "Insert a new ObjectId at the cursor.",
            NoArgs,
            |args| {
                parse_zero_arg(
                    ids::INSERT_OBJECT_ID_TO_EDITOR,
                    args,
                    Command::InsertObjectIdToEditor,
                )
            },
        ),
        CommandDefinition::new(
            ids::GENERATE_OBJECT_ID_TO_CLIPBOARD,
            "Copy a new ObjectId to the clipboard.",
            NoArgs,
            |args| {
                parse_zero_arg(
                    ids::GENERATE_OBJECT_ID_TO_CLIPBOARD,
                    args,
                    Command::GenerateObjectIdToClipboard,
                )
            },
        ),
    ]
}

fn export_definition(id: &'static str, description: &'static str, parse: Parser) -> CommandDefinition {
    CommandDefinition::new(id, description, CommandArgSummary::None, parse)
}

fn connection_node_definition(
    id: &'static str,
    description: &'static str,
    parse: Parser,
) -> CommandDefinition {
    CommandDefinition::new(id, description, CommandArgSummary::TreeNode, parse)
}

fn document_node_definition(
    id: &'static str,
    description: &'static str,
    parse: Parser,
) -> CommandDefinition {
    CommandDefinition::new(id, description, CommandArgSummary::TreeNode, parse)
}

fn is_absent(args: Option<&Value>) -> bool {
    matches!(args, None | Some(Value::Null))
}

fn ensure_no_args(command_id: &'static str, args: Option<&Value>) -> ServiceResult<()> {
    if is_absent(args) {
        return Ok(());
    }

    Err(ServiceError::InvalidArguments {
        command_id: command_id.to_owned(),
        reason: "this command does not accept args".to_owned(),
    })
}

fn parse_zero_arg(
    command_id: &'static str,
    args: Option<&Value>,
    command: Command,
) -> ServiceResult<Command> {
    ensure_no_args(command_id, args)?;
    Ok(command)
}

fn parse_export(
    command_id: &'static str,
    args: Option<&Value>,
    language: Language,
) -> ServiceResult<Command> {
    ensure_no_args(command_id, args)?;
    Ok(Command::ExportToLanguage(language))
}

fn parse_object<T>(command_id: &'static str, args: Option<&Value>, expected: &str) -> ServiceResult<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    let Some(args) = args.filter(|v| !v.is_null()) else {
        return Ok(T::default());
    };
    serde_json::from_value(args.clone()).map_err(|err| ServiceError::SchemaMismatch {
        command_id: command_id.to_owned(),
        expected: expected.to_owned(),
        details: err.to_string(),
    })
}

fn parse_uri_args(command_id: &'static str, args: Option<&Value>) -> ServiceResult<ConnectWithUriArgs> {
    parse_object(command_id, args, "{ uri?: string }")
}

/// Parse an optional tree node of one of `kinds`
fn parse_node(
    command_id: &'static str,
    args: Option<&Value>,
    kinds: &[NodeKind],
) -> ServiceResult<Option<TreeNode>> {
    let Some(args) = args.filter(|v| !v.is_null()) else {
        return Ok(None);
    };

    let node: TreeNode =
        serde_json::from_value(args.clone()).map_err(|err| ServiceError::SchemaMismatch {
            command_id: command_id.to_owned(),
            expected: "tree node { connectionId, kind, database?, collection?, item? }".to_owned(),
            details: err.to_string(),
        })?;

    node.validate()
        .map_err(|err| ServiceError::SchemaMismatch {
            command_id: command_id.to_owned(),
            expected: format!("a complete {} node", node.kind),
            details: err.to_string(),
        })?;

    if !kinds.contains(&node.kind) {
        let expected: Vec<String> = kinds.iter().map(ToString::to_string).collect();
        return Err(ServiceError::InvalidArguments {
            command_id: command_id.to_owned(),
            reason: format!(
                "expected a {} node, got {}",
                expected.join(" or "),
                node.kind
            ),
        });
    }

    Ok(Some(node))
}

fn parse_tree(
    command_id: &'static str,
    args: Option<&Value>,
    kinds: &[NodeKind],
    make: fn(TreeArg) -> Command,
) -> ServiceResult<Command> {
    parse_node(command_id, args, kinds).map(make)
}

/// Split `{ node, <extra> }` into the node value and the object, or treat the
/// whole value as a node
fn split_wrapped<'a>(args: Option<&'a Value>, extra: &str) -> (Option<&'a Value>, Option<&'a Value>) {
    match args {
        Some(Value::Object(map)) if map.contains_key("node") || map.contains_key(extra) => {
            (map.get("node"), map.get(extra))
        }
        other => (other, None),
    }
}

fn parse_rename(args: Option<&Value>) -> ServiceResult<RenameConnectionArgs> {
    let (node, name) = split_wrapped(args, "name");
    let node = parse_node(ids::RENAME_CONNECTION, node, &[NodeKind::Connection])?;
    let name = match name.filter(|v| !v.is_null()) {
        None => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(other) => {
            return Err(ServiceError::SchemaMismatch {
                command_id: ids::RENAME_CONNECTION.to_owned(),
                expected: "name: string".to_owned(),
                details: format!("got {other}"),
            });
        }
    };
    Ok(RenameConnectionArgs { node, name })
}

fn parse_create_index(args: Option<&Value>) -> ServiceResult<CreateIndexArgs> {
    let (node, keys) = split_wrapped(args, "keys");
    let node = parse_node(
        ids::CREATE_INDEX_FROM_TREE_VIEW,
        node,
        &[NodeKind::Collection, NodeKind::IndexList],
    )?;
    let keys = match keys.filter(|v| !v.is_null()) {
        None => None,
        Some(keys) => {
            let keys: IndexKeys =
                serde_json::from_value(keys.clone()).map_err(|err| ServiceError::SchemaMismatch {
                    command_id: ids::CREATE_INDEX_FROM_TREE_VIEW.to_owned(),
                    expected: "keys: { field: 1 | -1 | string }".to_owned(),
                    details: err.to_string(),
                })?;
            if keys.is_empty() {
                return Err(ServiceError::InvalidArguments {
                    command_id: ids::CREATE_INDEX_FROM_TREE_VIEW.to_owned(),
                    reason: "index keys must not be empty".to_owned(),
                });
            }
            Some(keys)
        }
    };
    Ok(CreateIndexArgs { node, keys })
}

fn parse_code_lens(args: Option<&Value>) -> ServiceResult<Command> {
    let args = args
        .filter(|v| !v.is_null())
        .ok_or_else(|| ServiceError::InvalidArguments {
            command_id: ids::OPEN_DOCUMENT_FROM_CODE_LENS.to_owned(),
            reason: "missing args payload; expected { namespace, documentId }".to_owned(),
        })?;

    let parsed: CodeLensDocumentArgs =
        serde_json::from_value(args.clone()).map_err(|err| ServiceError::SchemaMismatch {
            command_id: ids::OPEN_DOCUMENT_FROM_CODE_LENS.to_owned(),
            expected: "{ namespace: { database, collection }, documentId: string, connectionId?: string }".to_owned(),
            details: err.to_string(),
        })?;

    parsed
        .namespace
        .validate()
        .map_err(|err| ServiceError::InvalidArguments {
            command_id: ids::OPEN_DOCUMENT_FROM_CODE_LENS.to_owned(),
            reason: err.to_string(),
        })?;

    Ok(Command::OpenDocumentFromCodeLens(parsed))
}
