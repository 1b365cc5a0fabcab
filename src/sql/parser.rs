//! SQL Parser
//!
//! Recursive-descent parser over the token stream, one token of lookahead.
//! The first mismatch aborts the statement with a syntax error carrying the
//! byte offset of the offending token.

use super::ast::*;
use super::lexer::Lexer;
use super::token::{SpannedToken, Token};
use crate::catalog::DataType;
use crate::error::{Error, Result};
use crate::storage::CompareOp;

/// SQL Parser
pub struct Parser {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl Parser {
    /// Create a new parser for a SQL string
    pub fn new(sql: &str) -> Self {
        let tokens = Lexer::new(sql).tokenize();
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse a single SQL statement.
    ///
    /// The statement may end with a semicolon; anything after that is a
    /// syntax error.
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        if self.check(&Token::Semicolon) {
            self.advance();
        }
        self.expect(&Token::Eof)?;

        Ok(stmt)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            Token::Create => self.parse_create_table().map(Statement::CreateTable),
            Token::Drop => self.parse_drop_table().map(Statement::DropTable),
            Token::Alter => self.parse_alter_table().map(Statement::AlterTable),
            Token::Show => {
                self.advance();
                self.expect(&Token::Tables)?;
                Ok(Statement::ShowTables)
            }
            Token::Describe => {
                self.advance();
                self.expect_identifier().map(Statement::Describe)
            }
            Token::Begin => {
                self.advance();
                Ok(Statement::Begin)
            }
            Token::Commit => {
                self.advance();
                Ok(Statement::Commit)
            }
            Token::Rollback => {
                self.advance();
                Ok(Statement::Rollback)
            }
            _ => Err(self.error("expected a statement keyword")),
        }
    }

    // ========== SELECT ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let columns = self.parse_select_list()?;

        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;

        let join = self.parse_join_clause()?;

        let where_clause = self.parse_where_clause()?;

        let order_by = if self.check(&Token::Order) {
            self.advance();
            self.expect(&Token::By)?;
            let column = self.expect_identifier()?;
            let descending = if self.check(&Token::Desc) {
                self.advance();
                true
            } else {
                if self.check(&Token::Asc) {
                    self.advance();
                }
                false
            };
            Some(OrderBy { column, descending })
        } else {
            None
        };

        let limit = if self.check(&Token::Limit) {
            self.advance();
            match self.current().clone() {
                Token::IntegerLiteral(n) if n >= 0 => {
                    self.advance();
                    Some(n as usize)
                }
                _ => return Err(self.error("expected a non-negative integer after LIMIT")),
            }
        } else {
            None
        };

        Ok(SelectStatement {
            table_name,
            columns,
            join,
            where_clause,
            order_by,
            limit,
        })
    }

    /// Parse `*` or a comma-separated identifier list. A `table.column`
    /// qualifier is accepted; only the column part is kept.
    fn parse_select_list(&mut self) -> Result<Option<Vec<String>>> {
        if self.check(&Token::Asterisk) {
            self.advance();
            return Ok(None);
        }

        let mut columns = Vec::new();
        loop {
            let mut name = self.expect_identifier()?;
            if self.check(&Token::Dot) {
                self.advance();
                name = self.expect_identifier()?;
            }
            columns.push(name);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(Some(columns))
    }

    fn parse_join_clause(&mut self) -> Result<Option<JoinClause>> {
        let join_type = match self.current() {
            Token::Join => JoinType::Inner,
            Token::Inner => {
                self.advance();
                JoinType::Inner
            }
            Token::Left => {
                self.advance();
                JoinType::Left
            }
            Token::Right => {
                self.advance();
                JoinType::Right
            }
            _ => return Ok(None),
        };
        self.expect(&Token::Join)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::On)?;
        let left_column = self.expect_identifier()?;
        self.expect(&Token::Eq)?;
        let right_column = self.expect_identifier()?;

        Ok(Some(JoinClause {
            join_type,
            table_name,
            left_column,
            right_column,
        }))
    }

    // ========== INSERT ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;

        let table_name = self.expect_identifier()?;

        let columns = if self.check(&Token::LParen) {
            self.advance();
            let mut cols = Vec::new();
            loop {
                cols.push(self.expect_identifier()?);
                if !self.check(&Token::Comma) {
                    break;
                }
                self.advance();
            }
            self.expect(&Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect(&Token::Values)?;

        let mut values = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let mut row = Vec::new();
            loop {
                row.push(self.parse_literal()?);
                if !self.check(&Token::Comma) {
                    break;
                }
                self.advance();
            }
            self.expect(&Token::RParen)?;
            values.push(row);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== UPDATE ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push((column, value));

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = self.parse_where_clause()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    // ========== DELETE ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;

        let table_name = self.expect_identifier()?;

        let where_clause = self.parse_where_clause()?;

        Ok(DeleteStatement {
            table_name,
            where_clause,
        })
    }

    // ========== CREATE TABLE ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Create)?;
        self.expect(&Token::Table)?;

        let if_not_exists = if self.check(&Token::If) {
            self.advance();
            self.expect(&Token::Not)?;
            self.expect(&Token::Exists)?;
            true
        } else {
            false
        };

        let table_name = self.expect_identifier()?;

        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_spec()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
            if_not_exists,
        })
    }

    /// Parse a column definition: name, type, then any subset of
    /// PRIMARY KEY / UNIQUE / NOT NULL / AUTO_INCREMENT in any order.
    fn parse_column_spec(&mut self) -> Result<ColumnSpec> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;

        let mut spec = ColumnSpec::new(name, data_type);

        loop {
            match self.current() {
                Token::Primary => {
                    self.advance();
                    self.expect(&Token::Key)?;
                    spec.primary_key = true;
                }
                Token::Unique => {
                    self.advance();
                    spec.unique = true;
                }
                Token::Not => {
                    self.advance();
                    self.expect(&Token::Null)?;
                    spec.not_null = true;
                }
                Token::AutoIncrement => {
                    self.advance();
                    spec.auto_increment = true;
                }
                _ => break,
            }
        }

        Ok(spec)
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let dt = match self.current() {
            Token::Integer => DataType::Integer,
            Token::Text => DataType::Text,
            Token::Boolean => DataType::Boolean,
            Token::Real => DataType::Real,
            Token::Date => DataType::Date,
            _ => return Err(self.error("expected a data type")),
        };
        self.advance();
        Ok(dt)
    }

    // ========== DROP TABLE ==========

    fn parse_drop_table(&mut self) -> Result<DropTableStatement> {
        self.expect(&Token::Drop)?;
        self.expect(&Token::Table)?;

        let if_exists = if self.check(&Token::If) {
            self.advance();
            self.expect(&Token::Exists)?;
            true
        } else {
            false
        };

        let table_name = self.expect_identifier()?;

        Ok(DropTableStatement {
            table_name,
            if_exists,
        })
    }

    // ========== ALTER TABLE ==========

    fn parse_alter_table(&mut self) -> Result<AlterTableStatement> {
        self.expect(&Token::Alter)?;
        self.expect(&Token::Table)?;

        let table_name = self.expect_identifier()?;

        let action = match self.current() {
            Token::Add => {
                self.advance();
                self.skip_column_keyword();
                AlterAction::AddColumn(self.parse_column_spec()?)
            }
            Token::Drop => {
                self.advance();
                self.skip_column_keyword();
                AlterAction::DropColumn(self.expect_identifier()?)
            }
            Token::Rename => {
                self.advance();
                self.skip_column_keyword();
                let old = self.expect_identifier()?;
                self.expect(&Token::To)?;
                let new = self.expect_identifier()?;
                AlterAction::RenameColumn { old, new }
            }
            Token::Modify => {
                self.advance();
                self.skip_column_keyword();
                AlterAction::ModifyColumn(self.parse_column_spec()?)
            }
            _ => return Err(self.error("expected ADD, DROP, RENAME, or MODIFY")),
        };

        Ok(AlterTableStatement { table_name, action })
    }

    /// The COLUMN keyword after ADD/DROP/RENAME/MODIFY is optional noise.
    fn skip_column_keyword(&mut self) {
        if self.check(&Token::Column) {
            self.advance();
        }
    }

    // ========== WHERE ==========

    fn parse_where_clause(&mut self) -> Result<Option<Condition>> {
        if !self.check(&Token::Where) {
            return Ok(None);
        }
        self.advance();
        self.parse_condition().map(Some)
    }

    /// Parse a condition tree. AND and OR have equal precedence and fold
    /// left-associatively: `a OR b AND c` parses as `(a OR b) AND c`.
    fn parse_condition(&mut self) -> Result<Condition> {
        let mut left = self.parse_comparison()?;

        loop {
            let and = match self.current() {
                Token::And => true,
                Token::Or => false,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = if and {
                Condition::And(Box::new(left), Box::new(right))
            } else {
                Condition::Or(Box::new(left), Box::new(right))
            };
        }

        Ok(left)
    }

    /// Parse a `column OP value` leaf.
    fn parse_comparison(&mut self) -> Result<Condition> {
        let column = self.expect_identifier()?;

        let op = match self.current() {
            Token::Eq => CompareOp::Eq,
            Token::Neq => CompareOp::NotEq,
            Token::Lt => CompareOp::Lt,
            Token::Gt => CompareOp::Gt,
            Token::Lte => CompareOp::LtEq,
            Token::Gte => CompareOp::GtEq,
            Token::Like => CompareOp::Like,
            _ => return Err(self.error("expected a comparison operator")),
        };
        self.advance();

        let value = self.parse_literal()?;

        Ok(Condition::Compare { column, op, value })
    }

    // ========== Literals ==========

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.current().clone() {
            Token::Null => Literal::Null,
            Token::True => Literal::Boolean(true),
            Token::False => Literal::Boolean(false),
            Token::IntegerLiteral(n) => Literal::Integer(n),
            Token::FloatLiteral(f) => Literal::Float(f),
            Token::StringLiteral(s) => Literal::String(s),
            _ => return Err(self.error("expected a literal value")),
        };
        self.advance();
        Ok(literal)
    }

    // ========== Helpers ==========

    fn current(&self) -> &Token {
        &self.tokens[self.position].token
    }

    fn current_offset(&self) -> usize {
        self.tokens[self.position].offset
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn check(&self, expected: &Token) -> bool {
        self.current() == expected
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                expected,
                self.current()
            )))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("expected an identifier, found {}", other))),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::SyntaxError {
            message: message.into(),
            position: self.current_offset(),
        }
    }
}
