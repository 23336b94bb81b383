use crate::{drop_tables, ensure_not_has_tables};
use sea_orm::DbBackend;
use sea_orm_migration::prelude::{Index as MigrationIndex, Table as MigrationTable, *};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn name_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).string().not_null().unique_key().to_owned()
}

fn data_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).json().not_null().to_owned()
}

fn restrict<T, C, R, RC>(from_table: T, from_col: C, to_table: R, to_col: RC) -> ForeignKeyCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden,
    R: IntoIden + 'static,
    RC: IntoIden,
{
    ForeignKey::create()
        .from(from_table, from_col)
        .to(to_table, to_col)
        .on_delete(ForeignKeyAction::Restrict)
        .on_update(ForeignKeyAction::Restrict)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        ensure_not_has_tables!(
            manager,
            Network,
            Oob,
            NetworkSwitch,
            Pdu,
            Chassis,
            Psu,
            Server,
            NetworkAdapter,
            NetworkAdapterPort,
            NodeGroup,
            Node,
            NetworkConnection,
            Gender,
            GenderNode
        );

        if manager.get_database_backend() == DbBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        manager
            .create_table(
                MigrationTable::create()
                    .table(Network::Table)
                    .col(id_col(Network::Id))
                    .col(name_col(Network::Name))
                    .col(ColumnDef::new(Network::CableColour).string().not_null())
                    .col(data_col(Network::Data))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Oob::Table)
                    .col(id_col(Oob::Id))
                    .col(data_col(Oob::Data))
                    .col(ColumnDef::new(Oob::NetworkId).big_integer().not_null())
                    .foreign_key(&mut restrict(
                        Oob::Table,
                        Oob::NetworkId,
                        Network::Table,
                        Network::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(NetworkSwitch::Table)
                    .col(id_col(NetworkSwitch::Id))
                    .col(name_col(NetworkSwitch::Name))
                    .col(data_col(NetworkSwitch::Data))
                    .col(
                        ColumnDef::new(NetworkSwitch::OobId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(&mut restrict(
                        NetworkSwitch::Table,
                        NetworkSwitch::OobId,
                        Oob::Table,
                        Oob::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Pdu::Table)
                    .col(id_col(Pdu::Id))
                    .col(name_col(Pdu::Name))
                    .col(data_col(Pdu::Data))
                    .col(
                        ColumnDef::new(Pdu::OobId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(&mut restrict(Pdu::Table, Pdu::OobId, Oob::Table, Oob::Id))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Chassis::Table)
                    .col(id_col(Chassis::Id))
                    .col(name_col(Chassis::Name))
                    .col(data_col(Chassis::Data))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Psu::Table)
                    .col(id_col(Psu::Id))
                    .col(name_col(Psu::Name))
                    .col(data_col(Psu::Data))
                    .col(ColumnDef::new(Psu::ChassisId).big_integer().null())
                    .foreign_key(&mut restrict(
                        Psu::Table,
                        Psu::ChassisId,
                        Chassis::Table,
                        Chassis::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Server::Table)
                    .col(id_col(Server::Id))
                    .col(name_col(Server::Name))
                    .col(data_col(Server::Data))
                    .col(ColumnDef::new(Server::ChassisId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Server::OobId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(&mut restrict(
                        Server::Table,
                        Server::ChassisId,
                        Chassis::Table,
                        Chassis::Id,
                    ))
                    .foreign_key(&mut restrict(
                        Server::Table,
                        Server::OobId,
                        Oob::Table,
                        Oob::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(NetworkAdapter::Table)
                    .col(id_col(NetworkAdapter::Id))
                    .col(name_col(NetworkAdapter::Name))
                    .col(data_col(NetworkAdapter::Data))
                    .col(
                        ColumnDef::new(NetworkAdapter::ServerId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(&mut restrict(
                        NetworkAdapter::Table,
                        NetworkAdapter::ServerId,
                        Server::Table,
                        Server::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(NetworkAdapterPort::Table)
                    .col(id_col(NetworkAdapterPort::Id))
                    .col(
                        ColumnDef::new(NetworkAdapterPort::Number)
                            .integer()
                            .not_null()
                            .check(Expr::col(NetworkAdapterPort::Number).gte(1)),
                    )
                    .col(
                        ColumnDef::new(NetworkAdapterPort::NetworkAdapterId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                NetworkAdapterPort::Table,
                                NetworkAdapterPort::NetworkAdapterId,
                            )
                            .to(NetworkAdapter::Table, NetworkAdapter::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                MigrationIndex::create()
                    .name("idx_network_adapter_port_number")
                    .table(NetworkAdapterPort::Table)
                    .col(NetworkAdapterPort::NetworkAdapterId)
                    .col(NetworkAdapterPort::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(NodeGroup::Table)
                    .col(id_col(NodeGroup::Id))
                    .col(name_col(NodeGroup::Name))
                    .col(data_col(NodeGroup::Data))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Node::Table)
                    .col(id_col(Node::Id))
                    .col(name_col(Node::Name))
                    .col(data_col(Node::Data))
                    .col(ColumnDef::new(Node::ServerId).big_integer().not_null())
                    .col(ColumnDef::new(Node::GroupId).big_integer().not_null())
                    .foreign_key(&mut restrict(
                        Node::Table,
                        Node::ServerId,
                        Server::Table,
                        Server::Id,
                    ))
                    .foreign_key(&mut restrict(
                        Node::Table,
                        Node::GroupId,
                        NodeGroup::Table,
                        NodeGroup::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(NetworkConnection::Table)
                    .col(id_col(NetworkConnection::Id))
                    .col(
                        ColumnDef::new(NetworkConnection::NetworkId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NetworkConnection::NetworkAdapterPortId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(NetworkConnection::NetworkSwitchId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NetworkConnection::NodeId).big_integer().null())
                    .col(ColumnDef::new(NetworkConnection::Interface).string().null())
                    .foreign_key(&mut restrict(
                        NetworkConnection::Table,
                        NetworkConnection::NetworkId,
                        Network::Table,
                        Network::Id,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                NetworkConnection::Table,
                                NetworkConnection::NetworkAdapterPortId,
                            )
                            .to(NetworkAdapterPort::Table, NetworkAdapterPort::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(&mut restrict(
                        NetworkConnection::Table,
                        NetworkConnection::NetworkSwitchId,
                        NetworkSwitch::Table,
                        NetworkSwitch::Id,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .from(NetworkConnection::Table, NetworkConnection::NodeId)
                            .to(Node::Table, Node::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Gender::Table)
                    .col(id_col(Gender::Id))
                    .col(name_col(Gender::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(GenderNode::Table)
                    .col(ColumnDef::new(GenderNode::GenderId).big_integer().not_null())
                    .col(ColumnDef::new(GenderNode::NodeId).big_integer().not_null())
                    .primary_key(
                        MigrationIndex::create()
                            .col(GenderNode::GenderId)
                            .col(GenderNode::NodeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GenderNode::Table, GenderNode::GenderId)
                            .to(Gender::Table, Gender::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GenderNode::Table, GenderNode::NodeId)
                            .to(Node::Table, Node::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Dependents before the tables they reference
        drop_tables!(
            manager,
            GenderNode,
            Gender,
            NetworkConnection,
            Node,
            NodeGroup,
            NetworkAdapterPort,
            NetworkAdapter,
            Server,
            Psu,
            Chassis,
            Pdu,
            NetworkSwitch,
            Oob,
            Network
        );
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Network {
    Table,
    Id,
    Name,
    CableColour,
    Data,
}

#[derive(DeriveIden)]
enum Oob {
    Table,
    Id,
    Data,
    NetworkId,
}

#[derive(DeriveIden)]
enum NetworkSwitch {
    Table,
    Id,
    Name,
    Data,
    OobId,
}

#[derive(DeriveIden)]
enum Pdu {
    Table,
    Id,
    Name,
    Data,
    OobId,
}

#[derive(DeriveIden)]
enum Chassis {
    Table,
    Id,
    Name,
    Data,
}

#[derive(DeriveIden)]
enum Psu {
    Table,
    Id,
    Name,
    Data,
    ChassisId,
}

#[derive(DeriveIden)]
enum Server {
    Table,
    Id,
    Name,
    Data,
    ChassisId,
    OobId,
}

#[derive(DeriveIden)]
enum NetworkAdapter {
    Table,
    Id,
    Name,
    Data,
    ServerId,
}

#[derive(DeriveIden)]
enum NetworkAdapterPort {
    Table,
    Id,
    Number,
    NetworkAdapterId,
}

#[derive(DeriveIden)]
enum NodeGroup {
    Table,
    Id,
    Name,
    Data,
}

#[derive(DeriveIden)]
enum Node {
    Table,
    Id,
    Name,
    Data,
    ServerId,
    GroupId,
}

#[derive(DeriveIden)]
enum NetworkConnection {
    Table,
    Id,
    NetworkId,
    NetworkAdapterPortId,
    NetworkSwitchId,
    NodeId,
    Interface,
}

#[derive(DeriveIden)]
enum Gender {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum GenderNode {
    Table,
    GenderId,
    NodeId,
}
