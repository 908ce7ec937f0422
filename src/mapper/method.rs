use std::sync::Arc;

use crate::core::{MapperError, Result, Value};
use crate::executor::Executor;
use crate::mapper::interface::{MethodDecl, ReturnShape};
use crate::mapper::CallResult;
use crate::statement::{CommandKind, StatementDescriptor, StatementRegistry};

/// The statement a method dispatches to, resolved once at construction.
///
/// Resolution is fail-closed: a mapped method whose `{interface}.{method}`
/// id is not registered is an error, unless the declaration is a flush
/// trigger, which is allowed to run without a statement.
#[derive(Debug, Clone)]
pub struct SqlCommand {
    id: String,
    kind: CommandKind,
}

impl SqlCommand {
    pub fn resolve(
        statements: &StatementRegistry,
        interface_name: &str,
        decl: &MethodDecl,
    ) -> Result<Self> {
        let id = format!("{}.{}", interface_name, decl.name());
        if statements.contains(&id) {
            let descriptor = statements.get(&id)?;
            Ok(Self {
                id,
                kind: descriptor.command_kind,
            })
        } else if decl.is_flush() {
            Ok(Self {
                id,
                kind: CommandKind::Flush,
            })
        } else {
            Err(MapperError::StatementNotFound(id))
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }
}

/// Executable form of one declared method: the resolved command plus the
/// descriptor it runs, ready to shape arguments and results on every call.
pub struct MapperMethod {
    command: SqlCommand,
    descriptor: Option<Arc<StatementDescriptor>>,
    decl: Arc<MethodDecl>,
}

impl MapperMethod {
    pub fn new(
        statements: &StatementRegistry,
        interface_name: &str,
        decl: Arc<MethodDecl>,
    ) -> Result<Self> {
        let command = SqlCommand::resolve(statements, interface_name, &decl)?;
        let descriptor = match command.kind {
            CommandKind::Flush => None,
            _ => Some(statements.get(&command.id)?),
        };
        Ok(Self {
            command,
            descriptor,
            decl,
        })
    }

    pub fn command(&self) -> &SqlCommand {
        &self.command
    }

    pub fn execute(&self, executor: &dyn Executor, args: &[Value]) -> Result<CallResult> {
        match self.command.kind {
            CommandKind::Insert | CommandKind::Update | CommandKind::Delete => {
                let parameter = self.decl.shape_arguments(args);
                let rows = executor.update(self.descriptor()?, &parameter)?;
                self.shape_row_count(rows)
            }
            CommandKind::Select => {
                let parameter = self.decl.shape_arguments(args);
                self.execute_select(executor, &parameter)
            }
            CommandKind::Flush => Ok(CallResult::Batch(executor.flush_statements()?)),
        }
    }

    fn execute_select(&self, executor: &dyn Executor, parameter: &Value) -> Result<CallResult> {
        let descriptor = self.descriptor()?;
        match self.decl.return_shape() {
            ReturnShape::Many => Ok(CallResult::Many(executor.query(descriptor, parameter)?)),
            ReturnShape::One => {
                let mut rows = executor.query(descriptor, parameter)?;
                match rows.len() {
                    0 => Ok(CallResult::One(None)),
                    1 => Ok(CallResult::One(Some(rows.remove(0)))),
                    found => Err(MapperError::TooManyResults(self.command.id.clone(), found)),
                }
            }
            ReturnShape::Unit => {
                executor.query(descriptor, parameter)?;
                Ok(CallResult::Unit)
            }
            ReturnShape::Affected => Err(MapperError::TypeMismatch(format!(
                "Select method '{}' cannot produce an affected-row count",
                self.command.id
            ))),
        }
    }

    fn shape_row_count(&self, rows: u64) -> Result<CallResult> {
        match self.decl.return_shape() {
            ReturnShape::Affected => Ok(CallResult::Affected(rows)),
            ReturnShape::Unit => Ok(CallResult::Unit),
            ReturnShape::One | ReturnShape::Many => Err(MapperError::TypeMismatch(format!(
                "Method '{}' declares row results but runs a write statement",
                self.command.id
            ))),
        }
    }

    fn descriptor(&self) -> Result<&StatementDescriptor> {
        self.descriptor
            .as_deref()
            .ok_or_else(|| MapperError::StatementNotFound(self.command.id.clone()))
    }
}
