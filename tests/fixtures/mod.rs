//! Schema documents shared by the integration tests.

/// Tables, keys, an index and a check constraint. Valid for every dialect.
pub const INVENTORY: &str = r#"<dbsteward>
    <schema name="app">
        <table name="warehouses" primaryKey="id">
            <column name="id" type="int" null="false"/>
            <column name="city" type="varchar(100)" null="false"/>
        </table>
        <table name="items" primaryKey="id">
            <column name="id" type="int" null="false"/>
            <column name="warehouse_id" foreignTable="warehouses" foreignColumn="id"/>
            <column name="sku" type="varchar(40)" null="false"/>
            <column name="qty" type="int" null="false" default="0"/>
            <index name="items_sku_idx"><indexDimension>sku</indexDimension></index>
            <constraint name="items_qty_check" type="CHECK" definition="(qty &gt;= 0)"/>
        </table>
    </schema>
</dbsteward>"#;

/// A PostgreSQL shop exercising every object kind.
pub const SHOP: &str = r#"<dbsteward>
    <database>
        <role><owner>deployer</owner><application>app_user</application><readonly>reporting</readonly></role>
        <configurationParameter name="timezone" value="UTC"/>
    </database>
    <schema name="shop">
        <type name="order_status" type="enum">
            <enum name="new"/><enum name="paid"/><enum name="shipped"/>
        </type>
        <sequence name="invoice_seq" inc="1" start="1000"/>
        <function name="touch" returns="trigger">
            <functionDefinition language="plpgsql">BEGIN NEW.updated_at = now(); RETURN NEW; END</functionDefinition>
        </function>
        <table name="customers" primaryKey="id">
            <column name="id" type="serial" null="false"/>
            <column name="email" type="varchar(200)" null="false"/>
            <column name="updated_at" type="timestamp"/>
            <index name="customers_email_idx" unique="true"><indexDimension>email</indexDimension></index>
            <grant role="ROLE_APPLICATION" operation="SELECT, INSERT, UPDATE"/>
            <grant role="ROLE_READONLY" operation="SELECT"/>
        </table>
        <table name="orders" primaryKey="id">
            <column name="id" type="serial" null="false"/>
            <column name="customer_id" foreignTable="customers" foreignColumn="id"/>
            <column name="status" type="order_status" default="'new'"/>
            <column name="total" type="numeric(10,2)" null="false" default="0"/>
            <constraint name="orders_total_check" type="CHECK" definition="(total &gt;= 0)"/>
        </table>
        <table name="order_kinds" primaryKey="id">
            <column name="id" type="integer" null="false"/>
            <column name="label" type="text"/>
            <rows columns="id, label">
                <row><col>1</col><col>retail</col></row>
                <row><col>2</col><col>wholesale</col></row>
            </rows>
        </table>
        <trigger name="customers_touch" table="customers" when="BEFORE" event="UPDATE" function="shop.touch"/>
        <view name="open_orders">
            <viewQuery>SELECT id, customer_id FROM shop.orders WHERE status &lt;&gt; 'shipped'</viewQuery>
        </view>
    </schema>
</dbsteward>"#;

/// An empty document: the state before anything is deployed.
pub const EMPTY: &str = "<dbsteward/>";
